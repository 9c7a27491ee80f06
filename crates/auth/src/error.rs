//! Authentication errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Authentication error
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("x-user-info header missing")]
    MissingIdentity,

    #[error("invalid identity encoding: {0}")]
    InvalidIdentityEncoding(String),

    #[error("invalid identity payload: {0}")]
    InvalidIdentityPayload(String),

    #[error("authentication required")]
    Unauthenticated,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Decode failures never tell the caller why
        tracing::debug!(error = %self, "Request rejected as unauthenticated");

        let body = Json(json!({
            "error": {
                "code": "UNAUTHORIZED",
                "message": "Authentication required",
            }
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
