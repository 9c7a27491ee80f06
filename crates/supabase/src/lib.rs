//! Nextbase identity provider client
//!
//! Provides the application's view of the external auth service:
//! - Supabase Auth (GoTrue) HTTP client for production
//! - In-memory mock provider for tests and local development
//! - Provider error classification

pub mod claims;
pub mod client;
pub mod error;
pub mod mock;
pub mod types;

use std::sync::Arc;

pub use claims::{access_token_expired, decode_unverified, SupabaseClaims};
pub use client::SupabaseClient;
pub use error::{ProviderError, ProviderErrorKind};
pub use mock::MockIdentityProvider;
pub use types::{
    AuthChangeEvent, OtpType, ProviderUser, Session, SessionTokens, SignUpOutcome, SignUpRequest,
    UserLookup,
};

/// Identity provider configuration
#[derive(Clone)]
pub struct ProviderConfig {
    /// Provider backend (supabase, mock)
    pub provider: String,
    /// Supabase project URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Public anon key, sent as `apikey` on every request
    pub anon_key: String,
    /// Service role key for admin operations (user deletion)
    pub service_role_key: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("url", &self.url)
            .field("anon_key", &"[REDACTED]")
            .field(
                "service_role_key",
                &self.service_role_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Operations the application needs from the identity provider.
///
/// Every call that can rotate tokens reports the new session so the caller
/// can write it back to wherever the tokens live (cookies, client storage).
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the user behind a token pair, verifying with the provider.
    /// Refreshes an expired access token using the refresh token.
    async fn get_user(&self, tokens: &SessionTokens) -> Result<UserLookup, ProviderError>;

    /// Return the session for a token pair without a verification round-trip.
    /// Only refreshes (network) when the access token is expired.
    async fn get_session(&self, tokens: &SessionTokens) -> Result<Option<Session>, ProviderError>;

    /// Exchange a refresh token for a new session
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ProviderError>;

    /// Register a new account
    async fn sign_up(&self, request: SignUpRequest) -> Result<SignUpOutcome, ProviderError>;

    /// Password sign-in
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ProviderError>;

    /// Revoke the session behind an access token
    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError>;

    /// Verify an emailed one-time token hash
    async fn verify_otp(
        &self,
        token_hash: &str,
        otp_type: OtpType,
    ) -> Result<Option<Session>, ProviderError>;

    /// Send a password recovery email
    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), ProviderError>;

    /// Change the password of the user owning the access token
    async fn update_user_password(
        &self,
        access_token: &str,
        password: &str,
    ) -> Result<ProviderUser, ProviderError>;

    /// Delete a user (requires the service role key)
    async fn admin_delete_user(&self, user_id: &str) -> Result<(), ProviderError>;
}

/// Factory for creating IdentityProvider implementations
pub struct IdentityProviderFactory;

impl IdentityProviderFactory {
    /// Create an identity provider based on configuration
    pub fn create(config: ProviderConfig) -> Result<Arc<dyn IdentityProvider>, ProviderError> {
        match config.provider.as_str() {
            "supabase" => {
                tracing::info!(url = %config.url, "Creating Supabase identity provider");
                if config.url.is_empty() || config.anon_key.is_empty() {
                    return Err(ProviderError::new(
                        500,
                        Some("configuration".to_string()),
                        "SUPABASE_URL and SUPABASE_ANON_KEY are required for the supabase provider",
                    ));
                }
                Ok(Arc::new(SupabaseClient::new(config)))
            }
            "mock" => {
                tracing::info!("Creating mock identity provider");
                Ok(Arc::new(MockIdentityProvider::new()))
            }
            provider => Err(ProviderError::new(
                500,
                Some("configuration".to_string()),
                format!(
                    "Unknown identity provider: {}. Supported providers: supabase, mock",
                    provider
                ),
            )),
        }
    }
}
