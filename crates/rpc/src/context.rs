//! Per-request RPC context
//!
//! Built for every RPC call. Holds the request headers and cookies; the
//! authenticated provider session is only materialised when a procedure
//! asks for it, so public procedures never touch the provider.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::CookieJar;
use nextbase_auth::{reader, AuthBackend, IdentityDescriptor};
use nextbase_supabase::{IdentityProvider, Session, SessionTokens};
use tokio::sync::OnceCell;

use crate::error::RpcError;

/// Provider client bound to the caller's session
#[derive(Clone)]
pub struct ProviderSession {
    pub provider: Arc<dyn IdentityProvider>,
    pub session: Session,
    pub user_id: String,
}

impl std::fmt::Debug for ProviderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSession")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

pub struct RpcContext {
    headers: HeaderMap,
    tokens: SessionTokens,
    backend: AuthBackend,
    provider_session: OnceCell<ProviderSession>,
}

impl RpcContext {
    pub fn new(headers: HeaderMap, tokens: SessionTokens, backend: AuthBackend) -> Self {
        Self {
            headers,
            tokens,
            backend,
            provider_session: OnceCell::new(),
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Identity written by the session middleware
    pub fn identity(&self) -> IdentityDescriptor {
        reader::read(&self.headers)
    }

    /// Authenticated provider session, created on first call and cached for
    /// the rest of the request
    pub async fn provider_session(&self) -> Result<&ProviderSession, RpcError> {
        self.provider_session
            .get_or_try_init(|| async {
                let provider = self.backend.provider().clone();
                let session = provider
                    .get_session(&self.tokens)
                    .await
                    .map_err(|e| {
                        tracing::warn!(error = %e, "Failed to load provider session");
                        RpcError::unauthorized()
                    })?
                    .ok_or_else(RpcError::unauthorized)?;

                Ok(ProviderSession {
                    user_id: session.user.id.clone(),
                    provider,
                    session,
                })
            })
            .await
    }

    pub fn is_provider_session_loaded(&self) -> bool {
        self.provider_session.initialized()
    }

    /// Gate for protected procedures. Fails with UNAUTHORIZED without
    /// touching the provider when the request carries no identity.
    pub fn protect(self) -> Result<ProtectedContext, RpcError> {
        let user = self.identity().user().ok_or_else(RpcError::unauthorized)?;
        Ok(ProtectedContext {
            user_id: user.id,
            user_email: user.email,
            base: self,
        })
    }
}

impl<S> FromRequestParts<S> for RpcContext
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let backend = AuthBackend::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let tokens = backend.tokens(&jar);
        Ok(RpcContext::new(parts.headers.clone(), tokens, backend))
    }
}

/// Context handed to protected procedures. The user fields come from the
/// identity header and are not re-verified.
pub struct ProtectedContext {
    pub user_id: String,
    pub user_email: Option<String>,
    pub base: RpcContext,
}

impl ProtectedContext {
    pub async fn provider_session(&self) -> Result<&ProviderSession, RpcError> {
        self.base.provider_session().await
    }
}

/// Protected procedure extractor. Rejection happens before the handler runs.
pub struct Protected(pub ProtectedContext);

impl<S> FromRequestParts<S> for Protected
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = RpcError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let Ok(ctx) = RpcContext::from_request_parts(parts, state).await;
        ctx.protect().map(Protected)
    }
}
