//! Supabase Auth HTTP client
//!
//! Talks to the GoTrue REST API under `{url}/auth/v1`. Every request carries
//! the project's anon key as `apikey`; user-scoped calls add the access token
//! as a bearer token, admin calls use the service role key.

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::claims::access_token_expired;
use crate::{
    IdentityProvider, OtpType, ProviderConfig, ProviderError, ProviderErrorKind, ProviderUser,
    Session, SessionTokens, SignUpOutcome, SignUpRequest, UserLookup,
};

/// Real Supabase Auth client
pub struct SupabaseClient {
    http: reqwest::Client,
    auth_url: String,
    anon_key: String,
    service_role_key: Option<String>,
}

impl SupabaseClient {
    /// Create a new client from configuration
    pub fn new(config: ProviderConfig) -> Self {
        let auth_url = format!("{}/auth/v1", config.url.trim_end_matches('/'));
        Self {
            http: reqwest::Client::new(),
            auth_url,
            anon_key: config.anon_key,
            service_role_key: config.service_role_key,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.auth_url, path))
            .header("apikey", &self.anon_key)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ProviderError> {
        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::transport(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            let err = ProviderError::from_response(status.as_u16(), &body);
            tracing::debug!(status = %status, error = %err, "Supabase Auth request failed");
            return Err(err);
        }

        // Some endpoints answer 204 / empty bodies
        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(body)
            .map_err(|e| ProviderError::transport(format!("Unexpected response body: {}", e)))
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<(), ProviderError> {
        let _: serde_json::Value = self.send(request).await?;
        Ok(())
    }

    async fn fetch_user(&self, access_token: &str) -> Result<ProviderUser, ProviderError> {
        self.send(self.request(Method::GET, "/user").bearer_auth(access_token))
            .await
    }
}

/// GoTrue answers 401 or 403 (`bad_jwt`, `session_not_found`) when it no
/// longer accepts an access token.
fn access_token_rejected(err: &ProviderError) -> bool {
    err.status == 401
        || matches!(
            err.kind(),
            ProviderErrorKind::Invalid | ProviderErrorKind::Expired | ProviderErrorKind::SessionMissing
        )
}

#[async_trait::async_trait]
impl IdentityProvider for SupabaseClient {
    async fn get_user(&self, tokens: &SessionTokens) -> Result<UserLookup, ProviderError> {
        match (&tokens.access_token, &tokens.refresh_token) {
            (None, None) => Err(ProviderError::session_missing()),
            (Some(access), refresh) if !access_token_expired(access) || refresh.is_none() => {
                match self.fetch_user(access).await {
                    Ok(user) => Ok(UserLookup {
                        user,
                        refreshed: None,
                    }),
                    // Revoked or rotated server-side; one refresh attempt
                    Err(e) => match refresh {
                        Some(refresh) if access_token_rejected(&e) => {
                            let session = self.refresh_session(refresh).await?;
                            let user = self.fetch_user(&session.access_token).await?;
                            Ok(UserLookup {
                                user,
                                refreshed: Some(session),
                            })
                        }
                        _ => Err(e),
                    },
                }
            }
            (_, Some(refresh)) => {
                let session = self.refresh_session(refresh).await?;
                let user = self.fetch_user(&session.access_token).await?;
                Ok(UserLookup {
                    user,
                    refreshed: Some(session),
                })
            }
            (_, None) => Err(ProviderError::session_missing()),
        }
    }

    async fn get_session(&self, tokens: &SessionTokens) -> Result<Option<Session>, ProviderError> {
        let Some(access) = tokens.access_token.as_deref() else {
            return match tokens.refresh_token.as_deref() {
                Some(refresh) => self.refresh_session(refresh).await.map(Some),
                None => Ok(None),
            };
        };

        if access_token_expired(access) {
            return match tokens.refresh_token.as_deref() {
                Some(refresh) => self.refresh_session(refresh).await.map(Some),
                None => Ok(None),
            };
        }

        let claims = crate::claims::decode_unverified(access)?;
        Ok(Some(Session {
            access_token: access.to_string(),
            refresh_token: tokens.refresh_token.clone().unwrap_or_default(),
            token_type: "bearer".to_string(),
            expires_in: (claims.exp - chrono::Utc::now().timestamp()).max(0),
            expires_at: Some(claims.exp),
            user: ProviderUser {
                id: claims.sub,
                email: claims.email,
                user_metadata: serde_json::Value::Null,
                identities: None,
                email_confirmed_at: None,
                created_at: None,
            },
        }))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ProviderError> {
        self.send(
            self.request(Method::POST, "/token")
                .query(&[("grant_type", "refresh_token")])
                .json(&json!({ "refresh_token": refresh_token })),
        )
        .await
    }

    async fn sign_up(&self, request: SignUpRequest) -> Result<SignUpOutcome, ProviderError> {
        let mut builder = self.request(Method::POST, "/signup").json(&request);
        if let Some(redirect_to) = &request.email_redirect_to {
            builder = builder.query(&[("redirect_to", redirect_to)]);
        }

        let body: serde_json::Value = self.send(builder).await?;

        // Auto-confirm projects answer with a session, confirm-email projects with a bare user
        if body.get("access_token").is_some() {
            let session: Session = serde_json::from_value(body)
                .map_err(|e| ProviderError::transport(format!("Unexpected sign-up body: {}", e)))?;
            Ok(SignUpOutcome {
                user: Some(session.user.clone()),
                session: Some(session),
            })
        } else if body.get("id").is_some() {
            let user: ProviderUser = serde_json::from_value(body)
                .map_err(|e| ProviderError::transport(format!("Unexpected sign-up body: {}", e)))?;
            Ok(SignUpOutcome {
                user: Some(user),
                session: None,
            })
        } else {
            Ok(SignUpOutcome::default())
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ProviderError> {
        self.send(
            self.request(Method::POST, "/token")
                .query(&[("grant_type", "password")])
                .json(&json!({ "email": email, "password": password })),
        )
        .await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        self.send_empty(
            self.request(Method::POST, "/logout")
                .bearer_auth(access_token),
        )
        .await
    }

    async fn verify_otp(
        &self,
        token_hash: &str,
        otp_type: OtpType,
    ) -> Result<Option<Session>, ProviderError> {
        let body: serde_json::Value = self
            .send(
                self.request(Method::POST, "/verify")
                    .json(&json!({ "type": otp_type.as_str(), "token_hash": token_hash })),
            )
            .await?;

        if body.get("access_token").is_some() {
            serde_json::from_value(body)
                .map(Some)
                .map_err(|e| ProviderError::transport(format!("Unexpected verify body: {}", e)))
        } else {
            Ok(None)
        }
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), ProviderError> {
        self.send_empty(
            self.request(Method::POST, "/recover")
                .query(&[("redirect_to", redirect_to)])
                .json(&json!({ "email": email })),
        )
        .await
    }

    async fn update_user_password(
        &self,
        access_token: &str,
        password: &str,
    ) -> Result<ProviderUser, ProviderError> {
        self.send(
            self.request(Method::PUT, "/user")
                .bearer_auth(access_token)
                .json(&json!({ "password": password })),
        )
        .await
    }

    async fn admin_delete_user(&self, user_id: &str) -> Result<(), ProviderError> {
        let service_key = self.service_role_key.as_deref().ok_or_else(|| {
            ProviderError::new(
                500,
                Some("configuration".to_string()),
                "SUPABASE_SERVICE_ROLE_KEY is required for admin operations",
            )
        })?;

        self.send_empty(
            self.http
                .delete(format!("{}/admin/users/{}", self.auth_url, user_id))
                .header("apikey", service_key)
                .bearer_auth(service_key),
        )
        .await
    }
}
