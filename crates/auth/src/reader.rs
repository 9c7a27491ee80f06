//! Server-side identity reader
//!
//! Decodes the header written by the session middleware. Never calls the
//! identity provider and never fails: anything unreadable is anonymous.

use axum::http::HeaderMap;
use nextbase_supabase::{IdentityProvider, ProviderUser, SessionTokens};
use serde::Serialize;

use crate::error::AuthError;
use crate::identity::{AuthenticatedUser, IdentityDescriptor, USER_INFO_HEADER};

/// Page-level guard result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthCheck {
    pub user: Option<IdentityDescriptor>,
    pub is_authenticated: bool,
    pub should_redirect: bool,
}

/// Identity resolved directly against the provider
#[derive(Debug, Clone, PartialEq)]
pub struct DetailedIdentity {
    pub descriptor: IdentityDescriptor,
    pub user: Option<ProviderUser>,
}

fn try_read(headers: &HeaderMap) -> Result<IdentityDescriptor, AuthError> {
    let value = headers
        .get(USER_INFO_HEADER)
        .ok_or(AuthError::MissingIdentity)?
        .to_str()
        .map_err(|e| AuthError::InvalidIdentityEncoding(e.to_string()))?;
    IdentityDescriptor::decode(value)
}

/// Identity of the current request
pub fn read(headers: &HeaderMap) -> IdentityDescriptor {
    try_read(headers).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Treating request as unauthenticated");
        IdentityDescriptor::anonymous()
    })
}

/// The authenticated user, or `None`
pub fn require_auth(headers: &HeaderMap) -> Option<AuthenticatedUser> {
    read(headers).user()
}

pub fn check_auth(headers: &HeaderMap) -> AuthCheck {
    let descriptor = read(headers);
    let is_authenticated = descriptor.is_authenticated();
    AuthCheck {
        user: is_authenticated.then_some(descriptor),
        is_authenticated,
        should_redirect: !is_authenticated,
    }
}

/// Ask the provider directly instead of trusting the header. Any provider
/// failure downgrades to anonymous.
pub async fn identity_from_provider(
    provider: &dyn IdentityProvider,
    tokens: &SessionTokens,
) -> DetailedIdentity {
    if tokens.is_empty() {
        return DetailedIdentity {
            descriptor: IdentityDescriptor::anonymous(),
            user: None,
        };
    }

    match provider.get_user(tokens).await {
        Ok(lookup) => DetailedIdentity {
            descriptor: IdentityDescriptor::authenticated(
                lookup.user.id.clone(),
                lookup.user.email.clone(),
            ),
            user: Some(lookup.user),
        },
        Err(e) => {
            tracing::debug!(error = %e, "Provider identity lookup failed");
            DetailedIdentity {
                descriptor: IdentityDescriptor::anonymous(),
                user: None,
            }
        }
    }
}
