//! Identity provider errors
//!
//! GoTrue reports failures as `{ "code", "error_code", "msg" }` (or the older
//! OAuth-style `{ "error", "error_description" }`). Classification prefers the
//! structured `error_code` and falls back to the known message phrases.

use serde::Deserialize;
use thiserror::Error;

/// Error returned by an identity provider operation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    /// HTTP status reported by the provider (0 for transport failures)
    pub status: u16,
    /// Machine-readable provider error code, when present
    pub code: Option<String>,
    /// Free-text provider message
    pub message: String,
}

/// Provider failure categories the application branches on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    UserAlreadyExists,
    InvalidEmail,
    WeakPassword,
    InvalidCredentials,
    EmailNotConfirmed,
    UserNotFound,
    RateLimited,
    SamePassword,
    Expired,
    Invalid,
    SessionMissing,
    Transport,
    Unknown,
}

const STRUCTURED_CODES: &[(&str, ProviderErrorKind)] = &[
    ("user_already_exists", ProviderErrorKind::UserAlreadyExists),
    ("email_exists", ProviderErrorKind::UserAlreadyExists),
    ("email_address_invalid", ProviderErrorKind::InvalidEmail),
    ("weak_password", ProviderErrorKind::WeakPassword),
    ("invalid_credentials", ProviderErrorKind::InvalidCredentials),
    ("email_not_confirmed", ProviderErrorKind::EmailNotConfirmed),
    ("user_not_found", ProviderErrorKind::UserNotFound),
    ("over_request_rate_limit", ProviderErrorKind::RateLimited),
    ("over_email_send_rate_limit", ProviderErrorKind::RateLimited),
    ("same_password", ProviderErrorKind::SamePassword),
    ("otp_expired", ProviderErrorKind::Expired),
    ("session_expired", ProviderErrorKind::Expired),
    ("flow_state_expired", ProviderErrorKind::Expired),
    ("bad_jwt", ProviderErrorKind::Invalid),
    ("session_not_found", ProviderErrorKind::SessionMissing),
    ("refresh_token_not_found", ProviderErrorKind::SessionMissing),
    ("no_authorization", ProviderErrorKind::SessionMissing),
];

// Order matters: "Invalid login credentials" must win over "invalid",
// and "expired" over "invalid" ("Email link is invalid or has expired").
const MESSAGE_PHRASES: &[(&str, ProviderErrorKind)] = &[
    ("User already registered", ProviderErrorKind::UserAlreadyExists),
    ("Invalid login credentials", ProviderErrorKind::InvalidCredentials),
    ("Email not confirmed", ProviderErrorKind::EmailNotConfirmed),
    ("Invalid email", ProviderErrorKind::InvalidEmail),
    ("rate limit", ProviderErrorKind::RateLimited),
    ("weak", ProviderErrorKind::WeakPassword),
    ("same", ProviderErrorKind::SamePassword),
    ("Password", ProviderErrorKind::WeakPassword),
    ("not found", ProviderErrorKind::UserNotFound),
    ("Auth session missing", ProviderErrorKind::SessionMissing),
    ("expired", ProviderErrorKind::Expired),
    ("invalid", ProviderErrorKind::Invalid),
];

impl ProviderError {
    pub fn new(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// Transport-level failure (connection refused, timeout, undecodable body)
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(0, None, message)
    }

    /// No session tokens were supplied
    pub fn session_missing() -> Self {
        Self::new(
            401,
            Some("session_not_found".to_string()),
            "Auth session missing!",
        )
    }

    /// Classify the failure, structured code first, message phrases second
    pub fn kind(&self) -> ProviderErrorKind {
        if self.status == 0 {
            return ProviderErrorKind::Transport;
        }

        if let Some(code) = self.code.as_deref() {
            if let Some((_, kind)) = STRUCTURED_CODES.iter().find(|(c, _)| *c == code) {
                return *kind;
            }
        }

        MESSAGE_PHRASES
            .iter()
            .find(|(phrase, _)| self.message.contains(phrase))
            .map(|(_, kind)| *kind)
            .unwrap_or(ProviderErrorKind::Unknown)
    }

    /// Build an error from a non-success GoTrue response body
    pub fn from_response(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct GoTrueErrorBody {
            error_code: Option<String>,
            msg: Option<String>,
            message: Option<String>,
            error: Option<String>,
            error_description: Option<String>,
        }

        match serde_json::from_str::<GoTrueErrorBody>(body) {
            Ok(parsed) => {
                let message = parsed
                    .msg
                    .or(parsed.error_description)
                    .or(parsed.message)
                    .or_else(|| parsed.error.clone())
                    .unwrap_or_else(|| format!("Provider returned status {}", status));
                let code = parsed.error_code.or(parsed.error);
                Self::new(status, code, message)
            }
            Err(_) => Self::new(status, None, format!("Provider returned status {}: {}", status, body)),
        }
    }
}
