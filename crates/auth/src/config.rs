//! Session cookie and route protection settings

use nextbase_common::Config;

pub const DEFAULT_ACCESS_TOKEN_COOKIE: &str = "sb-access-token";
pub const DEFAULT_REFRESH_TOKEN_COOKIE: &str = "sb-refresh-token";

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Cookie carrying the access token
    pub access_token_cookie: String,
    /// Cookie carrying the refresh token
    pub refresh_token_cookie: String,
    /// Mark session cookies `Secure`
    pub secure_cookies: bool,
    /// Lifetime of the session cookies in days
    pub cookie_ttl_days: i64,
    /// Redirect unauthenticated requests outside `public_prefixes` to `login_path`
    pub redirect_unauthenticated: bool,
    pub login_path: String,
    pub public_prefixes: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_cookie: DEFAULT_ACCESS_TOKEN_COOKIE.to_string(),
            refresh_token_cookie: DEFAULT_REFRESH_TOKEN_COOKIE.to_string(),
            secure_cookies: false,
            cookie_ttl_days: 400,
            redirect_unauthenticated: false,
            login_path: "/login".to_string(),
            public_prefixes: vec!["/login".to_string(), "/auth".to_string()],
        }
    }
}

impl AuthConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            secure_cookies: config.site_url.starts_with("https://"),
            redirect_unauthenticated: config.redirect_unauthenticated,
            ..Self::default()
        }
    }

    /// Whether an unauthenticated request to `path` may proceed without redirect
    pub fn is_public(&self, path: &str) -> bool {
        self.public_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}
