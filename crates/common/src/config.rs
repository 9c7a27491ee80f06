//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Identity provider backends understood by the application
pub const SUPPORTED_AUTH_PROVIDERS: &[&str] = &["supabase", "mock"];

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection URL (PostgreSQL)
    pub database_url: String,

    /// Identity provider selection (supabase, mock)
    pub auth_provider: String,

    /// Supabase configuration
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: Option<String>,

    /// Public base URL of the site, used in email redirect links
    pub site_url: String,

    /// Redirect unauthenticated page requests to the login page
    pub redirect_unauthenticated: bool,

    /// Runtime configuration
    pub log_level: String,
    pub rust_log: String,
    /// Emit JSON log lines instead of pretty output (LOG_FORMAT=json)
    pub log_json: bool,
    pub port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("auth_provider", &self.auth_provider)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_anon_key", &"[REDACTED]")
            .field(
                "supabase_service_role_key",
                &self.supabase_service_role_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("site_url", &self.site_url)
            .field("redirect_unauthenticated", &self.redirect_unauthenticated)
            .field("log_level", &self.log_level)
            .field("rust_log", &self.rust_log)
            .field("log_json", &self.log_json)
            .field("port", &self.port)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let auth_provider = env::var("AUTH_PROVIDER").unwrap_or_else(|_| "supabase".to_string());

        if !SUPPORTED_AUTH_PROVIDERS.contains(&auth_provider.as_str()) {
            return Err(anyhow::anyhow!(
                "Unknown AUTH_PROVIDER: {}. Supported providers: {}",
                auth_provider,
                SUPPORTED_AUTH_PROVIDERS.join(", ")
            ));
        }

        let (supabase_url, supabase_anon_key) = if auth_provider == "supabase" {
            (
                env::var("SUPABASE_URL")
                    .map_err(|_| anyhow::anyhow!("SUPABASE_URL is required"))?,
                env::var("SUPABASE_ANON_KEY")
                    .map_err(|_| anyhow::anyhow!("SUPABASE_ANON_KEY is required"))?,
            )
        } else {
            (
                env::var("SUPABASE_URL").unwrap_or_else(|_| "http://localhost:54321".to_string()),
                env::var("SUPABASE_ANON_KEY").unwrap_or_default(),
            )
        };

        let config = Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL is required"))?,

            auth_provider,
            supabase_url,
            supabase_anon_key,
            supabase_service_role_key: env::var("SUPABASE_SERVICE_ROLE_KEY").ok(),

            site_url: env::var("SITE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),

            redirect_unauthenticated: env::var("AUTH_REDIRECT_UNAUTHENTICATED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "nextbase=debug".to_string()),
            log_json: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        };

        Ok(config)
    }

    /// Tracing filter: `LOG_LEVEL` sets the global level and `RUST_LOG`
    /// directives refine it per target.
    pub fn log_filter(&self) -> String {
        if self.rust_log.is_empty() {
            self.log_level.clone()
        } else {
            format!("{},{}", self.log_level, self.rust_log)
        }
    }
}
