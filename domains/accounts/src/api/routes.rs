//! Route definitions for the accounts API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::auth;
use super::middleware::AccountsState;

/// Create all account routes
pub fn routes() -> Router<AccountsState> {
    Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/reset-password", post(auth::request_password_reset))
        .route("/auth/update-password", post(auth::update_password))
        .route("/auth/confirm", get(auth::confirm))
}
