//! Session middleware
//!
//! Runs before every handler: validates the session cookies with the
//! identity provider, writes the resulting identity into `x-user-info` on
//! both the forwarded request and the response, and applies any cookie
//! rotation to the forwarded request and to the response that is returned.
//!
//! Refresh tokens are single use, so handlers must see the rotated pair.
//! A handler that sets a session cookie itself (login, logout) wins over the
//! middleware's write for that cookie.

use std::collections::HashSet;

use axum::{
    extract::{Request, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::backend::AuthBackend;
use crate::identity::USER_INFO_HEADER;

/// Use with `axum::middleware::from_fn_with_state(backend, session_middleware)`
pub async fn session_middleware(
    State(backend): State<AuthBackend>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let tokens = backend.tokens(&jar);
    let resolution = backend.resolve_session(&tokens).await;
    let header = resolution.descriptor.to_header_value();

    // `insert` replaces every inbound value, so clients cannot supply their own identity
    request
        .headers_mut()
        .insert(USER_INFO_HEADER, header.clone());
    forward_cookies(&mut request, &jar, &resolution.cookies);

    let config = backend.config();
    let path = request.uri().path();
    let mut response = if config.redirect_unauthenticated
        && !resolution.descriptor.is_authenticated()
        && !config.is_public(path)
    {
        tracing::debug!(path = %path, "Redirecting unauthenticated request to login");
        Redirect::temporary(&config.login_path).into_response()
    } else {
        next.run(request).await
    };

    response.headers_mut().insert(USER_INFO_HEADER, header);
    apply_cookies(&mut response, &resolution.cookies);
    response
}

/// Rewrite the request `Cookie` header so downstream extractors read the
/// rotated tokens. Removal cookies drop the pair entirely.
fn forward_cookies(request: &mut Request, jar: &CookieJar, cookies: &[Cookie<'static>]) {
    if cookies.is_empty() {
        return;
    }

    let rewritten: HashSet<&str> = cookies.iter().map(|c| c.name()).collect();
    let pairs: Vec<String> = jar
        .iter()
        .filter(|c| !rewritten.contains(c.name()))
        .chain(cookies.iter().filter(|c| !c.value().is_empty()))
        .map(|c| format!("{}={}", c.name(), c.value()))
        .collect();

    request.headers_mut().remove(COOKIE);
    if pairs.is_empty() {
        return;
    }
    match HeaderValue::from_str(&pairs.join("; ")) {
        Ok(value) => {
            request.headers_mut().insert(COOKIE, value);
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to forward rotated session cookies");
        }
    }
}

/// Names of the cookies the handler already set on `response`
fn cookies_set_by_handler(response: &Response) -> HashSet<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| Cookie::parse(v).ok())
        .map(|c| c.name().to_string())
        .collect()
}

fn apply_cookies(response: &mut Response, cookies: &[Cookie<'static>]) {
    let handled = cookies_set_by_handler(response);
    for cookie in cookies.iter().filter(|c| !handled.contains(c.name())) {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => {
                tracing::error!(error = %e, cookie = %cookie.name(), "Failed to encode session cookie");
            }
        }
    }
}
