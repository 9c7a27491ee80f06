//! Session propagation through the full application router
//!
//! Cookies in, `x-user-info` out: the middleware validates or refreshes the
//! session, and handlers only ever see the identity it wrote.

use axum::http::{header, StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use nextbase_auth::{IdentityDescriptor, USER_INFO_HEADER};
use nextbase_supabase::ProviderError;

use crate::common::{
    body_json, cookie_from_response, get, post_json, session_cookie, set_cookie_pairs, TestApp,
};

mod common;

fn identity_of(response: &axum::response::Response) -> IdentityDescriptor {
    let value = response
        .headers()
        .get(USER_INFO_HEADER)
        .expect("middleware always writes the identity header")
        .to_str()
        .unwrap();
    IdentityDescriptor::decode(value).unwrap()
}

#[tokio::test]
async fn test_anonymous_request_gets_anonymous_header() {
    let app = TestApp::new();

    let response = app.send(get("/api/rpc/example.getAll", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let raw = response.headers().get(USER_INFO_HEADER).unwrap().to_str().unwrap();
    let json: serde_json::Value = serde_json::from_slice(&STANDARD.decode(raw).unwrap()).unwrap();
    assert_eq!(json, serde_json::json!({"isAuthenticated": false}));
    assert!(set_cookie_pairs(response.headers()).is_empty());
}

#[tokio::test]
async fn test_valid_session_yields_authenticated_header() {
    let app = TestApp::new();
    let session = app.signed_in_user("alice@example.com");

    let response = app
        .send(get("/api/rpc/example.getAll", Some(&session_cookie(&session))))
        .await;

    let identity = identity_of(&response);
    assert!(identity.is_authenticated());
    assert_eq!(identity.id(), Some(session.user.id.as_str()));
    assert_eq!(identity.email(), Some("alice@example.com"));
    // No rotation, so no cookies are written
    assert!(set_cookie_pairs(response.headers()).is_empty());
}

#[tokio::test]
async fn test_spoofed_identity_header_is_replaced() {
    let app = TestApp::new();
    let forged = IdentityDescriptor::authenticated("attacker", Some("evil@example.com".to_string()));

    let mut request = post_json(
        "/api/rpc/example.create",
        serde_json::json!({"title": "Forged"}),
        None,
    );
    request
        .headers_mut()
        .insert(USER_INFO_HEADER, forged.to_header_value());

    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(!identity_of(&response).is_authenticated());
    assert!(app.examples.is_empty());
}

#[tokio::test]
async fn test_expired_access_token_is_refreshed_in_the_same_request() {
    let app = TestApp::new();
    app.provider.add_user("alice@example.com", common::PASSWORD, None);
    let expired = app.provider.issue_expired_session("alice@example.com").unwrap();

    let response = app
        .send(post_json(
            "/api/rpc/example.create",
            serde_json::json!({"title": "Written after refresh"}),
            Some(&session_cookie(&expired)),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(identity_of(&response).is_authenticated());

    let cookies = set_cookie_pairs(response.headers());
    assert_eq!(cookies.len(), 2);
    let refreshed_access = cookies
        .iter()
        .find(|(name, _)| name == "sb-access-token")
        .map(|(_, value)| value.clone())
        .unwrap();
    assert_ne!(refreshed_access, expired.access_token);
    assert_eq!(app.examples.len(), 1);

    // The rotated cookies keep working
    let next_cookie = cookie_from_response(response.headers());
    let response = app
        .send(get("/api/rpc/example.getAll", Some(&next_cookie)))
        .await;
    assert!(identity_of(&response).is_authenticated());
    assert!(set_cookie_pairs(response.headers()).is_empty());
}

#[tokio::test]
async fn test_unusable_session_clears_cookies() {
    let app = TestApp::new();

    let response = app
        .send(get(
            "/api/rpc/example.getAll",
            Some("sb-access-token=garbage; sb-refresh-token=unknown"),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!identity_of(&response).is_authenticated());
    let cookies = set_cookie_pairs(response.headers());
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().all(|(_, value)| value.is_empty()));
}

#[tokio::test]
async fn test_provider_outage_degrades_to_anonymous() {
    let app = TestApp::new();
    let session = app.signed_in_user("alice@example.com");
    app.provider
        .fail_on("get_user", ProviderError::transport("connection refused"));

    let response = app
        .send(get("/api/rpc/example.getAll", Some(&session_cookie(&session))))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!identity_of(&response).is_authenticated());
    // Cookies are left alone; the session may still be fine
    assert!(set_cookie_pairs(response.headers()).is_empty());
}

#[tokio::test]
async fn test_login_redirect_is_off_by_default() {
    let app = TestApp::new();
    let response = app.send(get("/", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_redirect_when_enabled() {
    let app = TestApp::with_login_redirect();

    let response = app.send(get("/", None)).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
    assert!(!identity_of(&response).is_authenticated());

    // Auth routes stay reachable
    let response = app
        .send(post_json(
            "/auth/reset-password",
            serde_json::json!({"email": ""}),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);

    let session = app.signed_in_user("alice@example.com");
    let response = app.send(get("/", Some(&session_cookie(&session)))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_check_bypasses_session_handling() {
    let app = TestApp::new();
    let response = app
        .send(get("/health", Some("sb-access-token=garbage")))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(USER_INFO_HEADER).is_none());
    assert_eq!(app.provider.call_count("get_user"), 0);
}
