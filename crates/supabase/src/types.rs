//! Provider wire types
//!
//! Shapes follow the GoTrue REST API so the HTTP client can deserialize
//! responses directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User record as returned by the identity provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
    /// Linked identities. An empty list on sign-up means the email is
    /// already registered and confirmed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identities: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ProviderUser {
    /// Display name stored in user metadata at sign-up
    pub fn name(&self) -> Option<&str> {
        self.user_metadata.get("name").and_then(|v| v.as_str())
    }
}

/// Issued session: the access/refresh token pair plus the user it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: ProviderUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Borrow the token pair of this session
    pub fn tokens(&self) -> SessionTokens {
        SessionTokens {
            access_token: Some(self.access_token.clone()),
            refresh_token: Some(self.refresh_token.clone()),
        }
    }
}

/// Token pair as found on an inbound request. Either half may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl SessionTokens {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Result of a "get current user" call
#[derive(Debug, Clone, PartialEq)]
pub struct UserLookup {
    pub user: ProviderUser,
    /// Set when the provider rotated the token pair while answering.
    /// The caller must persist these tokens (cookies) or the session is lost.
    pub refreshed: Option<Session>,
}

/// Sign-up request
#[derive(Debug, Clone, Serialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    /// Stored as user metadata (`data` on the wire)
    #[serde(rename = "data")]
    pub metadata: serde_json::Value,
    /// Where the confirmation link should land
    #[serde(skip)]
    pub email_redirect_to: Option<String>,
}

/// Sign-up result. With email confirmation enabled only `user` is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignUpOutcome {
    pub user: Option<ProviderUser>,
    pub session: Option<Session>,
}

/// Email OTP types accepted by the verify endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpType {
    Signup,
    Invite,
    Magiclink,
    Recovery,
    EmailChange,
    Email,
}

impl OtpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpType::Signup => "signup",
            OtpType::Invite => "invite",
            OtpType::Magiclink => "magiclink",
            OtpType::Recovery => "recovery",
            OtpType::EmailChange => "email_change",
            OtpType::Email => "email",
        }
    }
}

impl std::str::FromStr for OtpType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signup" => Ok(OtpType::Signup),
            "invite" => Ok(OtpType::Invite),
            "magiclink" => Ok(OtpType::Magiclink),
            "recovery" => Ok(OtpType::Recovery),
            "email_change" => Ok(OtpType::EmailChange),
            "email" => Ok(OtpType::Email),
            other => Err(format!("unknown otp type: {}", other)),
        }
    }
}

/// Auth state change pushed by the provider's client SDK
#[derive(Debug, Clone, PartialEq)]
pub enum AuthChangeEvent {
    InitialSession(Option<Session>),
    SignedIn(Session),
    SignedOut,
    TokenRefreshed(Session),
    UserUpdated(Session),
    PasswordRecovery(Session),
}

impl AuthChangeEvent {
    /// Wire name of the event (`SIGNED_IN`, `SIGNED_OUT`, ...)
    pub fn name(&self) -> &'static str {
        match self {
            AuthChangeEvent::InitialSession(_) => "INITIAL_SESSION",
            AuthChangeEvent::SignedIn(_) => "SIGNED_IN",
            AuthChangeEvent::SignedOut => "SIGNED_OUT",
            AuthChangeEvent::TokenRefreshed(_) => "TOKEN_REFRESHED",
            AuthChangeEvent::UserUpdated(_) => "USER_UPDATED",
            AuthChangeEvent::PasswordRecovery(_) => "PASSWORD_RECOVERY",
        }
    }

    /// Session carried by the event, if any
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthChangeEvent::InitialSession(session) => session.as_ref(),
            AuthChangeEvent::SignedIn(session)
            | AuthChangeEvent::TokenRefreshed(session)
            | AuthChangeEvent::UserUpdated(session)
            | AuthChangeEvent::PasswordRecovery(session) => Some(session),
            AuthChangeEvent::SignedOut => None,
        }
    }
}
