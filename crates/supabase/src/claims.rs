//! Access token claims
//!
//! The application never verifies access tokens itself; that is the
//! provider's job. Claims are only read to decide whether a token is past
//! its expiry and needs refreshing before it is sent upstream.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Refresh this many seconds before the token actually expires
pub const EXPIRY_MARGIN_SECONDS: i64 = 10;

/// JWT claims from Supabase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Email
    #[serde(default)]
    pub email: Option<String>,
    /// Issued at
    #[serde(default)]
    pub iat: Option<i64>,
    /// Expires at
    pub exp: i64,
    /// Audience
    #[serde(default)]
    pub aud: Option<String>,
    /// Role (authenticated user)
    #[serde(default)]
    pub role: Option<String>,
    /// Session identifier
    #[serde(default)]
    pub session_id: Option<String>,
}

impl SupabaseClaims {
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp - EXPIRY_MARGIN_SECONDS <= now
    }
}

/// Read claims without checking the signature
pub fn decode_unverified(token: &str) -> Result<SupabaseClaims, ProviderError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;

    decode::<SupabaseClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "Access token claims could not be decoded");
            ProviderError::new(401, Some("bad_jwt".to_string()), "invalid JWT: unable to parse claims")
        })
}

/// Whether the access token needs a refresh. Undecodable tokens count as expired.
pub fn access_token_expired(token: &str) -> bool {
    match decode_unverified(token) {
        Ok(claims) => claims.is_expired_at(chrono::Utc::now().timestamp()),
        Err(_) => true,
    }
}
