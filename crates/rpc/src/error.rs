//! RPC error kinds

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RpcErrorCode {
    Unauthorized,
    NotFound,
    InternalServerError,
    BadRequest,
}

impl RpcErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RpcErrorCode::Unauthorized => "UNAUTHORIZED",
            RpcErrorCode::NotFound => "NOT_FOUND",
            RpcErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
            RpcErrorCode::BadRequest => "BAD_REQUEST",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RpcErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            RpcErrorCode::NotFound => StatusCode::NOT_FOUND,
            RpcErrorCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            RpcErrorCode::BadRequest => StatusCode::BAD_REQUEST,
        }
    }
}

impl std::fmt::Display for RpcErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by a procedure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct RpcError {
    pub code: RpcErrorCode,
    pub message: String,
}

impl RpcError {
    pub fn new(code: RpcErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(RpcErrorCode::Unauthorized, "UNAUTHORIZED")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(RpcErrorCode::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(RpcErrorCode::InternalServerError, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(RpcErrorCode::BadRequest, message)
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
            }
        }));

        (self.code.status(), body).into_response()
    }
}
