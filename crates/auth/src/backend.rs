//! Authentication backend
//!
//! Wraps the identity provider and auth configuration. Domain states expose
//! it via `FromRef`:
//! ```ignore
//! impl FromRef<MyDomainState> for AuthBackend {
//!     fn from_ref(state: &MyDomainState) -> Self {
//!         state.auth.clone()
//!     }
//! }
//! ```

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, CookieJar};
use nextbase_supabase::{IdentityProvider, ProviderErrorKind, SessionTokens};

use crate::config::AuthConfig;
use crate::cookies::{clear_session_cookies, session_cookies, session_tokens};
use crate::identity::IdentityDescriptor;

/// Outcome of validating the session of one request
#[derive(Debug, Clone)]
pub struct SessionResolution {
    pub descriptor: IdentityDescriptor,
    /// Cookies that must be written on the response
    pub cookies: Vec<Cookie<'static>>,
}

#[derive(Clone)]
pub struct AuthBackend {
    provider: Arc<dyn IdentityProvider>,
    config: AuthConfig,
}

impl AuthBackend {
    pub fn new(provider: Arc<dyn IdentityProvider>, config: AuthConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.provider
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn tokens(&self, jar: &CookieJar) -> SessionTokens {
        session_tokens(jar, &self.config)
    }

    /// Validate (and if needed refresh) the session behind `tokens`.
    /// Provider failures yield an anonymous identity, never an error.
    pub async fn resolve_session(&self, tokens: &SessionTokens) -> SessionResolution {
        if tokens.is_empty() {
            return SessionResolution {
                descriptor: IdentityDescriptor::anonymous(),
                cookies: Vec::new(),
            };
        }

        match self.provider.get_user(tokens).await {
            Ok(lookup) => {
                let cookies = match &lookup.refreshed {
                    Some(session) => {
                        tracing::debug!(user_id = %lookup.user.id, "Session refreshed");
                        session_cookies(session, &self.config)
                    }
                    None => Vec::new(),
                };
                SessionResolution {
                    descriptor: IdentityDescriptor::authenticated(
                        lookup.user.id,
                        lookup.user.email,
                    ),
                    cookies,
                }
            }
            Err(e) => {
                let cookies = match e.kind() {
                    // Dead session: drop the cookies so the browser stops sending them
                    ProviderErrorKind::SessionMissing
                    | ProviderErrorKind::Invalid
                    | ProviderErrorKind::Expired
                    | ProviderErrorKind::UserNotFound => {
                        tracing::debug!(error = %e, "Session rejected by identity provider");
                        clear_session_cookies(&self.config)
                    }
                    _ => {
                        tracing::warn!(error = %e, status = e.status, "Session lookup failed");
                        Vec::new()
                    }
                };
                SessionResolution {
                    descriptor: IdentityDescriptor::anonymous(),
                    cookies,
                }
            }
        }
    }
}
