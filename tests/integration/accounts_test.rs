//! Account flows end to end: signup and confirmation, login and logout,
//! password recovery.

use axum::http::{header, StatusCode};
use nextbase_accounts::UserStore;
use nextbase_auth::{IdentityDescriptor, USER_INFO_HEADER};
use nextbase_supabase::OtpType;

use crate::common::{
    body_json, browser_cookies, cookie_from_response, get, post_json, session_cookie,
    set_cookie_pairs, TestApp, PASSWORD, SITE_URL,
};

mod common;

fn signup_body(email: &str) -> serde_json::Value {
    serde_json::json!({
        "name": "Alice",
        "email": email,
        "emailConfirm": email,
        "password": PASSWORD,
        "passwordConfirm": PASSWORD,
        "terms": true
    })
}

fn login_body(email: &str, password: &str) -> serde_json::Value {
    serde_json::json!({"email": email, "password": password, "remember": true})
}

fn is_authenticated(response: &axum::response::Response) -> bool {
    response
        .headers()
        .get(USER_INFO_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| IdentityDescriptor::decode(v).ok())
        .is_some_and(|identity| identity.is_authenticated())
}

#[tokio::test]
async fn test_signup_confirm_then_login() {
    let app = TestApp::with_email_confirmation();

    let response = app
        .send(post_json("/auth/signup", signup_body("alice@example.com"), None))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/auth/check-email"
    );

    let provider_user = app.provider.user_by_email("alice@example.com").unwrap();
    let row = app.users.find_by_id(&provider_user.id).await.unwrap().unwrap();
    assert_eq!(row.name.as_deref(), Some("Alice"));

    // Unconfirmed accounts cannot sign in yet
    let response = app
        .send(post_json(
            "/auth/login",
            login_body("alice@example.com", PASSWORD),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"]["code"], 403);

    let token = app
        .provider
        .issue_otp("alice@example.com", OtpType::Signup)
        .unwrap();
    let response = app
        .send(get(
            &format!("/auth/confirm?token_hash={}&type=signup&next=/welcome", token),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/welcome");
    assert_eq!(set_cookie_pairs(response.headers()).len(), 2);

    let response = app
        .send(post_json(
            "/auth/login",
            login_body("alice@example.com", PASSWORD),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({"success": true}));
}

#[tokio::test]
async fn test_duplicate_signup_is_conflict() {
    let app = TestApp::new();
    app.provider.add_user("alice@example.com", PASSWORD, None);

    let response = app
        .send(post_json("/auth/signup", signup_body("alice@example.com"), None))
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({
            "success": false,
            "error": {"code": 409, "message": "This email address is already registered"}
        })
    );
}

#[tokio::test]
async fn test_signup_rolls_back_provider_account_when_row_insert_fails() {
    let app = TestApp::new();
    app.users.fail_inserts(true);

    let response = app
        .send(post_json("/auth/signup", signup_body("alice@example.com"), None))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await["error"]["message"],
        "Failed to save user data"
    );
    assert!(app.provider.user_by_email("alice@example.com").is_none());
    assert_eq!(app.provider.call_count("admin_delete_user"), 1);
}

#[tokio::test]
async fn test_login_then_logout() {
    let app = TestApp::new();
    app.provider.add_user("alice@example.com", PASSWORD, None);

    let response = app
        .send(post_json(
            "/auth/login",
            login_body("alice@example.com", PASSWORD),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = cookie_from_response(response.headers());

    let response = app.send(get("/", Some(&cookie))).await;
    assert!(is_authenticated(&response));

    let response = app
        .send(post_json("/auth/logout", serde_json::json!({}), Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = set_cookie_pairs(response.headers());
    assert!(cleared
        .iter()
        .filter(|(name, _)| name.starts_with("sb-"))
        .all(|(_, value)| value.is_empty()));

    // The revoked session no longer authenticates, even if replayed
    let response = app.send(get("/", Some(&cookie))).await;
    assert!(!is_authenticated(&response));
}

#[tokio::test]
async fn test_logout_with_expired_access_token_revokes_refreshed_session() {
    let app = TestApp::new();
    app.provider.add_user("alice@example.com", PASSWORD, None);
    let laptop = app.provider.issue_expired_session("alice@example.com").unwrap();
    let phone = app.provider.issue_expired_session("alice@example.com").unwrap();
    let cookie = session_cookie(&laptop);

    let response = app
        .send(post_json("/auth/logout", serde_json::json!({}), Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(browser_cookies(&cookie, response.headers()), "");

    // Sign-out used the refreshed session, so it revoked every device
    let response = app.send(get("/", Some(&session_cookie(&phone)))).await;
    assert!(!is_authenticated(&response));
}

#[tokio::test]
async fn test_login_over_dead_cookies_keeps_new_session() {
    let app = TestApp::new();
    app.provider.add_user("alice@example.com", PASSWORD, None);
    let stale = "sb-access-token=garbage; sb-refresh-token=revoked";

    let response = app
        .send(post_json(
            "/auth/login",
            login_body("alice@example.com", PASSWORD),
            Some(stale),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let kept = browser_cookies(stale, response.headers());
    assert!(kept.contains("sb-access-token="));
    assert!(!kept.contains("garbage"));

    let response = app.send(get("/", Some(&kept))).await;
    assert!(is_authenticated(&response));
}

#[tokio::test]
async fn test_update_password_with_expired_access_token() {
    let app = TestApp::new();
    app.provider.add_user("alice@example.com", PASSWORD, None);
    let expired = app.provider.issue_expired_session("alice@example.com").unwrap();
    let cookie = session_cookie(&expired);

    let response = app
        .send(post_json(
            "/auth/update-password",
            serde_json::json!({"password": "NewSecret456", "passwordConfirm": "NewSecret456"}),
            Some(&cookie),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.provider.password_matches("alice@example.com", "NewSecret456"));

    // The browser ends up holding the rotated pair
    let kept = browser_cookies(&cookie, response.headers());
    assert!(!kept.contains(&expired.refresh_token));
    let response = app.send(get("/", Some(&kept))).await;
    assert!(is_authenticated(&response));
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = TestApp::new();
    app.provider.add_user("alice@example.com", PASSWORD, None);

    let response = app
        .send(post_json(
            "/auth/login",
            login_body("alice@example.com", "Wrong1234"),
            None,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["error"]["message"],
        "無効なログイン情報です"
    );
}

#[tokio::test]
async fn test_password_recovery_flow() {
    let app = TestApp::new();
    app.provider.add_user("alice@example.com", PASSWORD, None);

    let response = app
        .send(post_json(
            "/auth/reset-password",
            serde_json::json!({"email": "alice@example.com"}),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let emails = app.provider.recovery_emails();
    assert_eq!(emails.len(), 1);
    assert_eq!(
        emails[0].redirect_to,
        format!("{}/auth/update-password", SITE_URL)
    );

    let response = app
        .send(get(
            &format!(
                "/auth/confirm?token_hash={}&type=recovery",
                emails[0].token_hash
            ),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/auth/update-password"
    );
    let recovery_cookie = cookie_from_response(response.headers());

    let response = app
        .send(post_json(
            "/auth/update-password",
            serde_json::json!({"password": "NewSecret456", "passwordConfirm": "NewSecret456"}),
            Some(&recovery_cookie),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(app
        .provider
        .password_matches("alice@example.com", "NewSecret456"));

    // The link is single use
    let response = app
        .send(get(
            &format!(
                "/auth/confirm?token_hash={}&type=recovery",
                emails[0].token_hash
            ),
            None,
        ))
        .await;
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.contains("error_code=otp_expired"));
}

#[tokio::test]
async fn test_update_password_requires_session() {
    let app = TestApp::new();

    let response = app
        .send(post_json(
            "/auth/update-password",
            serde_json::json!({"password": "NewSecret456", "passwordConfirm": "NewSecret456"}),
            None,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["error"]["message"],
        "セッションが無効です。再度パスワードリセットを申請してください"
    );
}

#[tokio::test]
async fn test_confirm_without_params_for_recovery_page() {
    let app = TestApp::new();

    let response = app
        .send(get("/auth/confirm?next=/auth/update-password", None))
        .await;

    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/auth/update-password?error=missing_params&error_description=Missing+required+parameters"
    );
}
