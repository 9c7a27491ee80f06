//! Common test utilities for integration tests
//!
//! Builds the full application router over the mock identity provider and
//! in-memory stores, so the suite runs without a database or network.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, Request},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use nextbase_accounts::InMemoryUserStore;
use nextbase_app::{build_router, AppServices};
use nextbase_common::Config;
use nextbase_example::InMemoryExampleStore;
use nextbase_supabase::{MockIdentityProvider, Session};
use tower::ServiceExt;

pub const SITE_URL: &str = "http://localhost:3000";
pub const PASSWORD: &str = "Secret123";

/// Application under test plus handles on its collaborators
pub struct TestApp {
    pub router: Router,
    pub provider: MockIdentityProvider,
    pub users: InMemoryUserStore,
    pub examples: InMemoryExampleStore,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(MockIdentityProvider::new(), false)
    }

    /// Sign-up requires clicking the emailed confirmation link
    pub fn with_email_confirmation() -> Self {
        Self::build(MockIdentityProvider::with_email_confirmation(), false)
    }

    /// Unauthenticated page requests are redirected to /login
    pub fn with_login_redirect() -> Self {
        Self::build(MockIdentityProvider::new(), true)
    }

    fn build(provider: MockIdentityProvider, redirect_unauthenticated: bool) -> Self {
        let users = InMemoryUserStore::new();
        let examples = InMemoryExampleStore::new();
        let config = test_config(redirect_unauthenticated);

        let router = build_router(
            &config,
            AppServices {
                provider: Arc::new(provider.clone()),
                users: Arc::new(users.clone()),
                examples: Arc::new(examples.clone()),
            },
        );

        Self {
            router,
            provider,
            users,
            examples,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Registered, confirmed account with a live session
    pub fn signed_in_user(&self, email: &str) -> Session {
        self.provider.add_user(email, PASSWORD, Some("Test User"));
        self.provider.issue_session(email).unwrap()
    }
}

pub fn test_config(redirect_unauthenticated: bool) -> Config {
    Config {
        database_url: "postgres://localhost/nextbase_test".to_string(),
        auth_provider: "mock".to_string(),
        supabase_url: "http://localhost:54321".to_string(),
        supabase_anon_key: String::new(),
        supabase_service_role_key: None,
        site_url: SITE_URL.to_string(),
        redirect_unauthenticated,
        log_level: "debug".to_string(),
        rust_log: "nextbase=debug".to_string(),
        log_json: false,
        port: 3000,
    }
}

pub fn session_cookie(session: &Session) -> String {
    format!(
        "sb-access-token={}; sb-refresh-token={}",
        session.access_token, session.refresh_token
    )
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// `name=value` pairs of every Set-Cookie header, attributes dropped
pub fn set_cookie_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .collect()
}

/// Cookie header built from the session cookies a response set
pub fn cookie_from_response(headers: &HeaderMap) -> String {
    set_cookie_pairs(headers)
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Cookie header a browser would send next: it starts from `previous` and
/// applies every Set-Cookie in order, the last write per name winning and
/// empty values deleting the cookie.
pub fn browser_cookies(previous: &str, headers: &HeaderMap) -> String {
    let mut jar: Vec<(String, String)> = previous
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

    for (name, value) in set_cookie_pairs(headers) {
        jar.retain(|(existing, _)| *existing != name);
        if !value.is_empty() {
            jar.push((name, value));
        }
    }

    jar.into_iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
