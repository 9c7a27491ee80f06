//! Mock Identity Provider Implementation
//!
//! In-memory stand-in for Supabase Auth used by tests and local development.
//! Issues real HS256 access tokens so expiry and refresh paths behave like
//! the hosted service, records every call, and lets tests inject failures
//! per operation.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    IdentityProvider, OtpType, ProviderError, ProviderUser, Session, SessionTokens,
    SignUpOutcome, SignUpRequest, SupabaseClaims, UserLookup,
};

/// Signing secret of mock-issued access tokens
pub const MOCK_JWT_SECRET: &[u8] = b"nextbase-mock-identity-provider";

/// Lifetime of mock-issued access tokens
pub const MOCK_TOKEN_TTL_SECONDS: i64 = 3600;

const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone)]
struct MockAccount {
    user: ProviderUser,
    password: String,
    confirmed: bool,
}

/// Recovery email captured by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryEmail {
    pub email: String,
    pub redirect_to: String,
    pub token_hash: String,
}

#[derive(Debug, Default)]
struct MockState {
    accounts: HashMap<String, MockAccount>,
    refresh_tokens: HashMap<String, String>,
    revoked_access_tokens: HashSet<String>,
    otps: HashMap<String, (String, OtpType)>,
    recovery_emails: Vec<RecoveryEmail>,
    failures: HashMap<String, ProviderError>,
    calls: Vec<String>,
}

impl MockState {
    fn account_by_email(&self, email: &str) -> Option<&MockAccount> {
        self.accounts
            .values()
            .find(|a| a.user.email.as_deref() == Some(email))
    }

    fn issue_session(&mut self, user_id: &str, ttl: i64) -> Result<Session, ProviderError> {
        let user = self
            .accounts
            .get(user_id)
            .map(|a| a.user.clone())
            .ok_or_else(user_not_found)?;

        let now = Utc::now().timestamp();
        let claims = SupabaseClaims {
            sub: user.id.clone(),
            email: user.email.clone(),
            iat: Some(now),
            exp: now + ttl,
            aud: Some("authenticated".to_string()),
            role: Some("authenticated".to_string()),
            session_id: Some(Uuid::new_v4().to_string()),
        };
        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(MOCK_JWT_SECRET),
        )
        .map_err(|e| ProviderError::new(500, None, format!("Failed to sign token: {}", e)))?;

        let refresh_token = Uuid::new_v4().simple().to_string();
        self.refresh_tokens
            .insert(refresh_token.clone(), user.id.clone());

        Ok(Session {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
            expires_in: ttl,
            expires_at: Some(claims.exp),
            user,
        })
    }

    fn rotate(&mut self, refresh_token: &str) -> Result<Session, ProviderError> {
        // Refresh tokens are single use
        let user_id = self.refresh_tokens.remove(refresh_token).ok_or_else(|| {
            ProviderError::new(
                400,
                Some("refresh_token_not_found".to_string()),
                "Invalid Refresh Token: Refresh Token Not Found",
            )
        })?;
        self.issue_session(&user_id, MOCK_TOKEN_TTL_SECONDS)
    }

    fn verify_access(&self, token: &str) -> Result<SupabaseClaims, ProviderError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;

        let claims = decode::<SupabaseClaims>(
            token,
            &DecodingKey::from_secret(MOCK_JWT_SECRET),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            ProviderError::new(
                401,
                Some("bad_jwt".to_string()),
                format!("invalid JWT: {}", e),
            )
        })?;

        if self.revoked_access_tokens.contains(token) {
            return Err(ProviderError::session_missing());
        }
        if claims.exp <= Utc::now().timestamp() {
            return Err(ProviderError::new(
                401,
                Some("bad_jwt".to_string()),
                "invalid JWT: token is expired",
            ));
        }
        if !self.accounts.contains_key(&claims.sub) {
            return Err(user_not_found());
        }
        Ok(claims)
    }

    fn issue_otp(&mut self, user_id: &str, otp_type: OtpType) -> String {
        let token_hash = Uuid::new_v4().simple().to_string();
        self.otps
            .insert(token_hash.clone(), (user_id.to_string(), otp_type));
        token_hash
    }
}

fn user_not_found() -> ProviderError {
    ProviderError::new(404, Some("user_not_found".to_string()), "User not found")
}

/// Mock identity provider for testing
#[derive(Debug, Clone)]
pub struct MockIdentityProvider {
    state: Arc<Mutex<MockState>>,
    require_email_confirmation: bool,
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockIdentityProvider {
    /// Create a mock where sign-up returns a session immediately
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            require_email_confirmation: false,
        }
    }

    /// Create a mock that requires email confirmation before sign-in
    pub fn with_email_confirmation() -> Self {
        Self {
            require_email_confirmation: true,
            ..Self::new()
        }
    }

    /// Seed a confirmed user
    pub fn add_user(&self, email: &str, password: &str, name: Option<&str>) -> ProviderUser {
        let user = ProviderUser {
            id: Uuid::new_v4().to_string(),
            email: Some(email.to_string()),
            user_metadata: match name {
                Some(name) => serde_json::json!({ "name": name }),
                None => serde_json::json!({}),
            },
            identities: Some(vec![serde_json::json!({ "provider": "email" })]),
            email_confirmed_at: Some(Utc::now()),
            created_at: Some(Utc::now()),
        };

        self.state.lock().unwrap().accounts.insert(
            user.id.clone(),
            MockAccount {
                user: user.clone(),
                password: password.to_string(),
                confirmed: true,
            },
        );
        user
    }

    /// Issue a fresh session for an existing user, bypassing the password check
    pub fn issue_session(&self, email: &str) -> Option<Session> {
        self.issue_session_with_ttl(email, MOCK_TOKEN_TTL_SECONDS)
    }

    /// Issue a session whose access token has already expired but whose
    /// refresh token is still valid
    pub fn issue_expired_session(&self, email: &str) -> Option<Session> {
        self.issue_session_with_ttl(email, -60)
    }

    fn issue_session_with_ttl(&self, email: &str, ttl: i64) -> Option<Session> {
        let mut state = self.state.lock().unwrap();
        let user_id = state.account_by_email(email)?.user.id.clone();
        state.issue_session(&user_id, ttl).ok()
    }

    /// Issue an email OTP token hash for a user
    pub fn issue_otp(&self, email: &str, otp_type: OtpType) -> Option<String> {
        let mut state = self.state.lock().unwrap();
        let user_id = state.account_by_email(email)?.user.id.clone();
        Some(state.issue_otp(&user_id, otp_type))
    }

    /// Make every subsequent call of `operation` fail with `error`
    pub fn fail_on(&self, operation: &str, error: ProviderError) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(operation.to_string(), error);
    }

    /// Remove all injected failures
    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failures.clear();
    }

    /// Operations called so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of times `operation` was called
    pub fn call_count(&self, operation: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.as_str() == operation)
            .count()
    }

    pub fn user_by_email(&self, email: &str) -> Option<ProviderUser> {
        self.state
            .lock()
            .unwrap()
            .account_by_email(email)
            .map(|a| a.user.clone())
    }

    pub fn user_count(&self) -> usize {
        self.state.lock().unwrap().accounts.len()
    }

    /// Whether `password` is the current password of the user
    pub fn password_matches(&self, email: &str, password: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .account_by_email(email)
            .map(|a| a.password == password)
            .unwrap_or(false)
    }

    /// Recovery emails "sent" so far
    pub fn recovery_emails(&self) -> Vec<RecoveryEmail> {
        self.state.lock().unwrap().recovery_emails.clone()
    }

    fn begin(&self, operation: &str) -> Result<std::sync::MutexGuard<'_, MockState>, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(operation.to_string());
        if let Some(error) = state.failures.get(operation) {
            tracing::debug!(operation, error = %error, "Mock identity provider injected failure");
            return Err(error.clone());
        }
        Ok(state)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn get_user(&self, tokens: &SessionTokens) -> Result<UserLookup, ProviderError> {
        let mut state = self.begin("get_user")?;

        let verified = tokens.access_token.as_deref().map(|t| state.verify_access(t));
        match (verified, tokens.refresh_token.as_deref()) {
            (Some(Ok(claims)), _) => {
                let user = state
                    .accounts
                    .get(&claims.sub)
                    .map(|a| a.user.clone())
                    .ok_or_else(user_not_found)?;
                Ok(UserLookup {
                    user,
                    refreshed: None,
                })
            }
            (_, Some(refresh_token)) => {
                let session = state.rotate(refresh_token)?;
                Ok(UserLookup {
                    user: session.user.clone(),
                    refreshed: Some(session),
                })
            }
            (Some(Err(e)), None) => Err(e),
            (None, None) => Err(ProviderError::session_missing()),
        }
    }

    async fn get_session(&self, tokens: &SessionTokens) -> Result<Option<Session>, ProviderError> {
        let mut state = self.begin("get_session")?;

        let verified = tokens.access_token.as_deref().map(|t| state.verify_access(t));
        match (verified, tokens.refresh_token.as_deref()) {
            (Some(Ok(claims)), _) => {
                let user = state
                    .accounts
                    .get(&claims.sub)
                    .map(|a| a.user.clone())
                    .ok_or_else(user_not_found)?;
                Ok(Some(Session {
                    access_token: tokens.access_token.clone().unwrap_or_default(),
                    refresh_token: tokens.refresh_token.clone().unwrap_or_default(),
                    token_type: "bearer".to_string(),
                    expires_in: claims.exp - Utc::now().timestamp(),
                    expires_at: Some(claims.exp),
                    user,
                }))
            }
            (_, Some(refresh_token)) => state.rotate(refresh_token).map(Some),
            (_, None) => Ok(None),
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ProviderError> {
        self.begin("refresh_session")?.rotate(refresh_token)
    }

    async fn sign_up(&self, request: SignUpRequest) -> Result<SignUpOutcome, ProviderError> {
        let mut state = self.begin("sign_up")?;

        if !request.email.contains('@') {
            return Err(ProviderError::new(
                400,
                Some("email_address_invalid".to_string()),
                "Unable to validate email address: invalid format",
            ));
        }
        if request.password.len() < MIN_PASSWORD_LENGTH {
            return Err(ProviderError::new(
                422,
                Some("weak_password".to_string()),
                "Password should be at least 6 characters.",
            ));
        }

        if let Some(existing) = state.account_by_email(&request.email) {
            if self.require_email_confirmation {
                // Confirm-email projects hide existing accounts behind an empty identity list
                let mut user = existing.user.clone();
                user.identities = Some(Vec::new());
                return Ok(SignUpOutcome {
                    user: Some(user),
                    session: None,
                });
            }
            return Err(ProviderError::new(
                422,
                Some("user_already_exists".to_string()),
                "User already registered",
            ));
        }

        let confirmed = !self.require_email_confirmation;
        let user = ProviderUser {
            id: Uuid::new_v4().to_string(),
            email: Some(request.email.clone()),
            user_metadata: request.metadata.clone(),
            identities: Some(vec![serde_json::json!({ "provider": "email" })]),
            email_confirmed_at: confirmed.then(Utc::now),
            created_at: Some(Utc::now()),
        };
        state.accounts.insert(
            user.id.clone(),
            MockAccount {
                user: user.clone(),
                password: request.password,
                confirmed,
            },
        );

        if confirmed {
            let session = state.issue_session(&user.id, MOCK_TOKEN_TTL_SECONDS)?;
            Ok(SignUpOutcome {
                user: Some(user),
                session: Some(session),
            })
        } else {
            state.issue_otp(&user.id, OtpType::Signup);
            Ok(SignUpOutcome {
                user: Some(user),
                session: None,
            })
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ProviderError> {
        let mut state = self.begin("sign_in_with_password")?;

        let account = state
            .account_by_email(email)
            .filter(|a| a.password == password)
            .cloned()
            .ok_or_else(|| {
                ProviderError::new(
                    400,
                    Some("invalid_credentials".to_string()),
                    "Invalid login credentials",
                )
            })?;

        if !account.confirmed {
            return Err(ProviderError::new(
                400,
                Some("email_not_confirmed".to_string()),
                "Email not confirmed",
            ));
        }

        state.issue_session(&account.user.id, MOCK_TOKEN_TTL_SECONDS)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let mut state = self.begin("sign_out")?;
        let claims = state.verify_access(access_token)?;

        // Global scope: every refresh token of the user is revoked
        state.refresh_tokens.retain(|_, user_id| *user_id != claims.sub);
        state
            .revoked_access_tokens
            .insert(access_token.to_string());
        Ok(())
    }

    async fn verify_otp(
        &self,
        token_hash: &str,
        otp_type: OtpType,
    ) -> Result<Option<Session>, ProviderError> {
        let mut state = self.begin("verify_otp")?;

        let user_id = match state.otps.remove(token_hash) {
            Some((user_id, issued_type)) if issued_type == otp_type => user_id,
            _ => {
                return Err(ProviderError::new(
                    403,
                    Some("otp_expired".to_string()),
                    "Email link is invalid or has expired",
                ))
            }
        };

        if let Some(account) = state.accounts.get_mut(&user_id) {
            account.confirmed = true;
            account.user.email_confirmed_at = Some(Utc::now());
        }
        state.issue_session(&user_id, MOCK_TOKEN_TTL_SECONDS).map(Some)
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), ProviderError> {
        let mut state = self.begin("reset_password_for_email")?;

        // Unknown addresses succeed silently so accounts cannot be probed
        let Some(user_id) = state.account_by_email(email).map(|a| a.user.id.clone()) else {
            return Ok(());
        };
        let token_hash = state.issue_otp(&user_id, OtpType::Recovery);
        state.recovery_emails.push(RecoveryEmail {
            email: email.to_string(),
            redirect_to: redirect_to.to_string(),
            token_hash,
        });
        Ok(())
    }

    async fn update_user_password(
        &self,
        access_token: &str,
        password: &str,
    ) -> Result<ProviderUser, ProviderError> {
        let mut state = self.begin("update_user_password")?;
        let claims = state.verify_access(access_token)?;

        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(ProviderError::new(
                422,
                Some("weak_password".to_string()),
                "Password should be at least 6 characters.",
            ));
        }

        let account = state
            .accounts
            .get_mut(&claims.sub)
            .ok_or_else(user_not_found)?;
        if account.password == password {
            return Err(ProviderError::new(
                422,
                Some("same_password".to_string()),
                "New password should be different from the old password.",
            ));
        }
        account.password = password.to_string();
        Ok(account.user.clone())
    }

    async fn admin_delete_user(&self, user_id: &str) -> Result<(), ProviderError> {
        let mut state = self.begin("admin_delete_user")?;
        state.accounts.remove(user_id).ok_or_else(user_not_found)?;
        state.refresh_tokens.retain(|_, owner| owner.as_str() != user_id);
        Ok(())
    }
}
