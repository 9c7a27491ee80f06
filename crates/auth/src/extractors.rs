//! Axum extractors for the request identity
//!
//! Both read the `x-user-info` header written by `session_middleware`;
//! neither calls the identity provider.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AuthError;
use crate::identity::{AuthenticatedUser, IdentityDescriptor};
use crate::reader;

/// Identity of the current request, anonymous when absent or unreadable
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub IdentityDescriptor);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(CurrentIdentity(reader::read(&parts.headers)))
    }
}

/// Authenticated user extractor. Rejects with 401 UNAUTHORIZED.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        reader::require_auth(&parts.headers)
            .map(RequireAuth)
            .ok_or(AuthError::Unauthenticated)
    }
}
