//! Account action result type
//!
//! Actions answer `{"success": true}` or
//! `{"success": false, "error": {"code": <http status>, "message": "..."}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use super::messages;

/// Failed account action. `code` doubles as the HTTP status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ActionError {
    pub code: u16,
    pub message: String,
}

impl ActionError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(401, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Form validation failures report the first message, fields taken in name order
impl From<ValidationErrors> for ActionError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let message = fields
            .iter()
            .flat_map(|(_, errs)| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| messages::INVALID_INPUT.to_string());

        ActionError::bad_request(message)
    }
}

#[derive(Debug, Serialize)]
struct ActionErrorBody<'a> {
    success: bool,
    error: ActionErrorDetail<'a>,
}

#[derive(Debug, Serialize)]
struct ActionErrorDetail<'a> {
    code: u16,
    message: &'a str,
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        let body = ActionErrorBody {
            success: false,
            error: ActionErrorDetail {
                code: self.code,
                message: &self.message,
            },
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Body of a successful action
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ActionSuccess {
    pub success: bool,
}

impl ActionSuccess {
    pub fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}
