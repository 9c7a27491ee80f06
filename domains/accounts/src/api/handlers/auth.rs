//! Account action handlers
//!
//! - POST /auth/signup - Register, then redirect to the check-email page
//! - POST /auth/login - Password sign-in, sets the session cookies
//! - POST /auth/logout - Revoke the session and clear its cookies
//! - POST /auth/reset-password - Send a password recovery email
//! - POST /auth/update-password - Set a new password for the current session
//! - GET /auth/confirm - Verify an emailed token hash and redirect

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use nextbase_auth::{clear_session_cookies, session_cookies, AuthBackend};
use nextbase_supabase::Session;

use crate::actions::CHECK_EMAIL_PATH;
use crate::api::middleware::AccountsState;
use crate::domain::error::{ActionError, ActionSuccess};
use crate::domain::forms::{
    ConfirmParams, LoginForm, ResetPasswordForm, SignupForm, UpdatePasswordForm,
};

fn with_session(jar: CookieJar, session: &Session, auth: &AuthBackend) -> CookieJar {
    session_cookies(session, auth.config())
        .into_iter()
        .fold(jar, |jar, cookie| jar.add(cookie))
}

fn without_session(jar: CookieJar, auth: &AuthBackend) -> CookieJar {
    clear_session_cookies(auth.config())
        .into_iter()
        .fold(jar, |jar, cookie| jar.add(cookie))
}

/// Session cookies without a max-age end with the browser session
fn browser_session_cookies(session: &Session, auth: &AuthBackend) -> Vec<Cookie<'static>> {
    session_cookies(session, auth.config())
        .into_iter()
        .map(|mut cookie| {
            cookie.set_max_age(None::<time::Duration>);
            cookie
        })
        .collect()
}

pub async fn signup(
    State(state): State<AccountsState>,
    Json(form): Json<SignupForm>,
) -> Result<Redirect, ActionError> {
    state.actions.signup(form).await?;
    Ok(Redirect::to(CHECK_EMAIL_PATH))
}

pub async fn login(
    State(state): State<AccountsState>,
    jar: CookieJar,
    Json(form): Json<LoginForm>,
) -> Result<(CookieJar, Json<ActionSuccess>), ActionError> {
    let remember = form.remember;
    let session = state.actions.login(form).await?;

    let jar = if remember {
        with_session(jar, &session, &state.auth)
    } else {
        browser_session_cookies(&session, &state.auth)
            .into_iter()
            .fold(jar, |jar, cookie| jar.add(cookie))
    };
    Ok((jar, ActionSuccess::ok()))
}

/// Cookies are cleared even when the provider call fails
pub async fn logout(State(state): State<AccountsState>, jar: CookieJar) -> Response {
    let tokens = state.auth.tokens(&jar);
    let result = state.actions.logout(&tokens).await;
    let jar = without_session(jar, &state.auth);

    match result {
        Ok(()) => (jar, ActionSuccess::ok()).into_response(),
        Err(e) => (jar, e).into_response(),
    }
}

pub async fn request_password_reset(
    State(state): State<AccountsState>,
    Json(form): Json<ResetPasswordForm>,
) -> Result<Json<ActionSuccess>, ActionError> {
    state.actions.request_password_reset(form).await?;
    Ok(ActionSuccess::ok())
}

pub async fn update_password(
    State(state): State<AccountsState>,
    jar: CookieJar,
    Json(form): Json<UpdatePasswordForm>,
) -> Result<(CookieJar, Json<ActionSuccess>), ActionError> {
    let tokens = state.auth.tokens(&jar);
    let session = state.actions.update_password(&tokens, form).await?;

    // get_session may have rotated the tokens
    let jar = if session.tokens() != tokens {
        with_session(jar, &session, &state.auth)
    } else {
        jar
    };
    Ok((jar, ActionSuccess::ok()))
}

pub async fn confirm(
    State(state): State<AccountsState>,
    jar: CookieJar,
    Query(params): Query<ConfirmParams>,
) -> (CookieJar, Redirect) {
    let outcome = state.actions.confirm(params).await;

    let jar = match &outcome.session {
        Some(session) => with_session(jar, session, &state.auth),
        None => jar,
    };
    (jar, Redirect::temporary(&outcome.location))
}
