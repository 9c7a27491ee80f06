//! Account actions
//!
//! Each action talks to the identity provider (and, for signup, the user
//! table) and answers with an [`ActionError`] carrying the user-facing
//! message on failure. Cookies are the caller's concern.

use std::sync::Arc;

use nextbase_supabase::{
    IdentityProvider, OtpType, ProviderError, ProviderErrorKind, ProviderUser, Session,
    SessionTokens, SignUpRequest,
};
use validator::Validate;

use crate::domain::entities::NewUser;
use crate::domain::error::ActionError;
use crate::domain::forms::{
    ConfirmParams, LoginForm, ResetPasswordForm, SignupForm, UpdatePasswordForm,
};
use crate::domain::messages;
use crate::repository::UserStore;

/// Landing page after a successful signup
pub const CHECK_EMAIL_PATH: &str = "/auth/check-email";
/// Page where a recovery session sets its new password
pub const UPDATE_PASSWORD_PATH: &str = "/auth/update-password";
/// Generic error page
pub const ERROR_PATH: &str = "/error";

const OTP_EXPIRED_REDIRECT: &str = "/auth/update-password?error=access_denied&error_code=otp_expired&error_description=Email+link+is+invalid+or+has+expired";
const INVALID_TOKEN_REDIRECT: &str = "/auth/update-password?error=access_denied&error_code=invalid_token&error_description=Invalid+or+malformed+token";
const MISSING_PARAMS_REDIRECT: &str =
    "/auth/update-password?error=missing_params&error_description=Missing+required+parameters";

/// Where the confirmation link sends the browser, plus the session it opened
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmOutcome {
    pub location: String,
    pub session: Option<Session>,
}

impl ConfirmOutcome {
    fn redirect(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            session: None,
        }
    }
}

#[derive(Clone)]
pub struct AccountActions {
    provider: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserStore>,
    site_url: String,
}

impl AccountActions {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserStore>,
        site_url: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            users,
            site_url: site_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Register with the provider, then store the user row.
    /// If the row cannot be written the provider account is deleted again.
    pub async fn signup(&self, form: SignupForm) -> Result<ProviderUser, ActionError> {
        form.validate()?;

        let request = SignUpRequest {
            email: form.email.clone(),
            password: form.password,
            metadata: serde_json::json!({ "name": form.name }),
            email_redirect_to: Some(format!("{}/login", self.site_url)),
        };

        let outcome = self.provider.sign_up(request).await.map_err(|e| {
            tracing::warn!(error = %e, code = ?e.code, "Provider sign-up failed");
            signup_error(&e)
        })?;

        let user = outcome.user.ok_or_else(|| {
            tracing::error!("Provider sign-up returned no user");
            ActionError::internal(messages::FAILED_TO_CREATE_USER)
        })?;

        // Confirmed addresses come back as a user without identities
        if user.identities.as_ref().is_some_and(|i| i.is_empty()) {
            return Err(ActionError::new(409, messages::EMAIL_ALREADY_REGISTERED));
        }

        let new_user = NewUser {
            id: user.id.clone(),
            email: user.email.clone().unwrap_or(form.email),
            name: Some(form.name),
        };

        if let Err(e) = self.users.create(new_user).await {
            tracing::error!(error = %e, user_id = %user.id, "Failed to save user row");
            if let Err(delete_err) = self.provider.admin_delete_user(&user.id).await {
                tracing::error!(
                    error = %delete_err,
                    user_id = %user.id,
                    "Failed to delete provider account after user row failure"
                );
            }
            return Err(ActionError::internal(messages::FAILED_TO_SAVE_USER_DATA));
        }

        tracing::info!(user_id = %user.id, "User signed up");
        Ok(user)
    }

    pub async fn login(&self, form: LoginForm) -> Result<Session, ActionError> {
        form.validate()?;

        let session = self
            .provider
            .sign_in_with_password(&form.email, &form.password)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, code = ?e.code, "Sign-in failed");
                match e.kind() {
                    ProviderErrorKind::InvalidCredentials => {
                        ActionError::unauthorized(messages::INVALID_LOGIN)
                    }
                    ProviderErrorKind::EmailNotConfirmed => {
                        ActionError::new(403, messages::EMAIL_NOT_CONFIRMED)
                    }
                    _ => ActionError::internal(messages::LOGIN_FAILED),
                }
            })?;

        log_login(&session, form.remember);
        Ok(session)
    }

    /// Revoke the session upstream. A session the provider no longer knows
    /// counts as signed out.
    pub async fn logout(&self, tokens: &SessionTokens) -> Result<(), ActionError> {
        let Some(access_token) = tokens.access_token.as_deref() else {
            return Ok(());
        };

        match self.provider.sign_out(access_token).await {
            Ok(()) => Ok(()),
            Err(e) if is_stale_session(&e) => {
                tracing::debug!(error = %e, "Session already gone upstream");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Sign-out failed");
                Err(ActionError::internal(messages::LOGOUT_FAILED))
            }
        }
    }

    pub async fn request_password_reset(&self, form: ResetPasswordForm) -> Result<(), ActionError> {
        if form.email.trim().is_empty() {
            return Err(ActionError::bad_request(messages::EMAIL_REQUIRED));
        }
        form.validate()?;

        let redirect_to = format!("{}{}", self.site_url, UPDATE_PASSWORD_PATH);
        self.provider
            .reset_password_for_email(form.email.trim(), &redirect_to)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, code = ?e.code, "Password reset request failed");
                match e.kind() {
                    ProviderErrorKind::UserNotFound
                    | ProviderErrorKind::InvalidEmail
                    | ProviderErrorKind::Invalid => {
                        ActionError::bad_request(messages::EMAIL_NOT_FOUND)
                    }
                    ProviderErrorKind::RateLimited => {
                        ActionError::bad_request(messages::RESET_RATE_LIMITED)
                    }
                    ProviderErrorKind::Transport => ActionError::internal(messages::SYSTEM_ERROR),
                    _ => ActionError::bad_request(messages::RESET_REQUEST_FAILED),
                }
            })
    }

    /// Set a new password for the session behind `tokens` (normally the
    /// recovery session opened by the confirmation link). Returns the session
    /// used, which may have been refreshed.
    pub async fn update_password(
        &self,
        tokens: &SessionTokens,
        form: UpdatePasswordForm,
    ) -> Result<Session, ActionError> {
        if form.password.is_empty() {
            return Err(ActionError::bad_request(messages::PASSWORD_REQUIRED));
        }
        form.validate()?;

        let session = match self.provider.get_session(tokens).await {
            Ok(Some(session)) => session,
            Ok(None) => return Err(ActionError::unauthorized(messages::RESET_SESSION_MISSING)),
            Err(e) => {
                tracing::warn!(error = %e, "No usable session for password update");
                return Err(match e.kind() {
                    ProviderErrorKind::SessionMissing => {
                        ActionError::unauthorized(messages::RESET_SESSION_MISSING)
                    }
                    ProviderErrorKind::Transport => ActionError::internal(messages::SYSTEM_ERROR),
                    _ => ActionError::bad_request(messages::RESET_SESSION_EXPIRED),
                });
            }
        };

        self.provider
            .update_user_password(&session.access_token, &form.password)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, code = ?e.code, "Password update failed");
                match e.kind() {
                    ProviderErrorKind::WeakPassword => {
                        ActionError::bad_request(messages::PASSWORD_TOO_WEAK)
                    }
                    ProviderErrorKind::SamePassword => {
                        ActionError::bad_request(messages::PASSWORD_UNCHANGED)
                    }
                    ProviderErrorKind::Expired
                    | ProviderErrorKind::Invalid
                    | ProviderErrorKind::SessionMissing => {
                        ActionError::bad_request(messages::RESET_SESSION_EXPIRED)
                    }
                    ProviderErrorKind::Transport => ActionError::internal(messages::SYSTEM_ERROR),
                    _ => ActionError::bad_request(messages::PASSWORD_UPDATE_FAILED),
                }
            })?;

        tracing::info!(user_id = %session.user.id, "Password updated");
        Ok(session)
    }

    /// Verify an emailed token hash and pick the redirect target
    pub async fn confirm(&self, params: ConfirmParams) -> ConfirmOutcome {
        let next = safe_next(params.next.as_deref());
        let raw_type = params.otp_type.as_deref().filter(|t| !t.is_empty());
        let token_hash = params.token_hash.as_deref().filter(|t| !t.is_empty());

        let (Some(token_hash), Some(raw_type)) = (token_hash, raw_type) else {
            tracing::warn!("Confirmation link is missing token_hash or type");
            let wants_update_password = params
                .next
                .as_deref()
                .is_some_and(|n| n.contains("update-password"));
            return if raw_type == Some(OtpType::Recovery.as_str()) || wants_update_password {
                ConfirmOutcome::redirect(MISSING_PARAMS_REDIRECT)
            } else {
                ConfirmOutcome::redirect(ERROR_PATH)
            };
        };

        // The provider rejects unknown types, and only recovery failures get a
        // dedicated page
        let Ok(otp_type) = raw_type.parse::<OtpType>() else {
            tracing::warn!(otp_type = raw_type, "Confirmation link has an unknown type");
            return ConfirmOutcome::redirect(ERROR_PATH);
        };

        match self.provider.verify_otp(token_hash, otp_type).await {
            Ok(session) => {
                let location = if otp_type == OtpType::Recovery {
                    UPDATE_PASSWORD_PATH.to_string()
                } else {
                    next
                };
                ConfirmOutcome { location, session }
            }
            Err(e) => {
                tracing::warn!(error = %e, otp_type = otp_type.as_str(), "OTP verification failed");
                if otp_type != OtpType::Recovery {
                    return ConfirmOutcome::redirect(ERROR_PATH);
                }
                match e.kind() {
                    ProviderErrorKind::Expired => ConfirmOutcome::redirect(OTP_EXPIRED_REDIRECT),
                    ProviderErrorKind::Invalid => ConfirmOutcome::redirect(INVALID_TOKEN_REDIRECT),
                    _ => ConfirmOutcome::redirect(format!(
                        "{}?error=verification_failed&error_description={}",
                        UPDATE_PASSWORD_PATH,
                        urlencoding::encode(&e.message)
                    )),
                }
            }
        }
    }
}

#[mutants::skip] // Only affects log output
fn log_login(session: &Session, remember: bool) {
    if remember {
        tracing::info!(user_id = %session.user.id, "User logged in with a persistent session");
    } else {
        tracing::info!(user_id = %session.user.id, "User logged in with a browser session");
    }
}

fn signup_error(e: &ProviderError) -> ActionError {
    match e.kind() {
        ProviderErrorKind::UserAlreadyExists => {
            ActionError::new(409, messages::EMAIL_ALREADY_REGISTERED)
        }
        ProviderErrorKind::InvalidEmail => ActionError::bad_request(messages::INVALID_EMAIL),
        ProviderErrorKind::WeakPassword => ActionError::bad_request(messages::INVALID_PASSWORD),
        _ => ActionError::internal(messages::FAILED_TO_CREATE_ACCOUNT),
    }
}

fn is_stale_session(e: &ProviderError) -> bool {
    matches!(e.status, 401 | 403 | 404)
        || matches!(
            e.kind(),
            ProviderErrorKind::SessionMissing | ProviderErrorKind::UserNotFound
        )
}

/// Only same-site relative paths are followed after confirmation
fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
        _ => "/".to_string(),
    }
}
