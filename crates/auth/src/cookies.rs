//! Session cookie helpers

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use nextbase_supabase::{Session, SessionTokens};
use time::Duration;

use crate::config::AuthConfig;

/// Read the token pair from the request cookies
pub fn session_tokens(jar: &CookieJar, config: &AuthConfig) -> SessionTokens {
    let read = |name: &str| {
        jar.get(name)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    };
    SessionTokens {
        access_token: read(&config.access_token_cookie),
        refresh_token: read(&config.refresh_token_cookie),
    }
}

fn session_cookie(name: &str, value: &str, config: &AuthConfig) -> Cookie<'static> {
    Cookie::build((name.to_string(), value.to_string()))
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::days(config.cookie_ttl_days))
        .build()
}

/// Cookies persisting a freshly issued session
pub fn session_cookies(session: &Session, config: &AuthConfig) -> Vec<Cookie<'static>> {
    vec![
        session_cookie(&config.access_token_cookie, &session.access_token, config),
        session_cookie(&config.refresh_token_cookie, &session.refresh_token, config),
    ]
}

/// Removal cookies for both session tokens
pub fn clear_session_cookies(config: &AuthConfig) -> Vec<Cookie<'static>> {
    [&config.access_token_cookie, &config.refresh_token_cookie]
        .into_iter()
        .map(|name| {
            Cookie::build((name.to_string(), ""))
                .path("/".to_string())
                .max_age(Duration::ZERO)
                .build()
        })
        .collect()
}
