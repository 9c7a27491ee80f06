//! Identity descriptor and its header encoding
//!
//! The descriptor travels from the session middleware to server-side
//! consumers as `x-user-info: base64(JSON)`. Field order is fixed, so
//! re-encoding a decoded header reproduces it byte for byte.

use axum::http::HeaderValue;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Header carrying the encoded identity descriptor
pub const USER_INFO_HEADER: &str = "x-user-info";

/// Authentication state of the current request.
///
/// Only two shapes exist: anonymous (no id, no email) and authenticated.
/// Fields are private so no other combination can be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityDescriptor {
    is_authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
}

/// An authenticated user as seen by server-side code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: Option<String>,
}

impl IdentityDescriptor {
    pub fn anonymous() -> Self {
        Self {
            is_authenticated: false,
            id: None,
            email: None,
        }
    }

    pub fn authenticated(id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            is_authenticated: true,
            id: Some(id.into()),
            email,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// The authenticated user, if any
    pub fn user(&self) -> Option<AuthenticatedUser> {
        match (self.is_authenticated, &self.id) {
            (true, Some(id)) => Some(AuthenticatedUser {
                id: id.clone(),
                email: self.email.clone(),
            }),
            _ => None,
        }
    }

    /// base64(JSON) form used on the wire
    pub fn encode(&self) -> String {
        // Serializing a struct of strings and a bool cannot fail
        let json = serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"isAuthenticated":false}"#.to_string()
        });
        STANDARD.encode(json)
    }

    pub fn to_header_value(&self) -> HeaderValue {
        HeaderValue::from_str(&self.encode())
            .unwrap_or_else(|_| HeaderValue::from_static("eyJpc0F1dGhlbnRpY2F0ZWQiOmZhbHNlfQ=="))
    }

    /// Parse the wire form. Payloads that claim authentication without an
    /// id are rejected; unauthenticated payloads drop any stray fields.
    pub fn decode(value: &str) -> Result<Self, AuthError> {
        let bytes = STANDARD
            .decode(value.trim())
            .map_err(|e| AuthError::InvalidIdentityEncoding(e.to_string()))?;
        let json =
            String::from_utf8(bytes).map_err(|e| AuthError::InvalidIdentityEncoding(e.to_string()))?;
        let descriptor: IdentityDescriptor = serde_json::from_str(&json)
            .map_err(|e| AuthError::InvalidIdentityPayload(e.to_string()))?;

        match descriptor {
            IdentityDescriptor {
                is_authenticated: true,
                id: Some(id),
                email,
            } => Ok(Self::authenticated(id, email)),
            IdentityDescriptor {
                is_authenticated: true,
                id: None,
                ..
            } => Err(AuthError::InvalidIdentityPayload(
                "authenticated identity without id".to_string(),
            )),
            _ => Ok(Self::anonymous()),
        }
    }
}

impl Default for IdentityDescriptor {
    fn default() -> Self {
        Self::anonymous()
    }
}
