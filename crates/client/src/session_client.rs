//! Browser-side provider client
//!
//! Keeps the session JSON in a `DynamicStorage` and broadcasts auth state
//! changes to subscribers such as the auth state provider.

use std::sync::Arc;

use nextbase_supabase::{
    access_token_expired, AuthChangeEvent, IdentityProvider, ProviderError, ProviderUser,
    Session,
};
use tokio::sync::broadcast;

use crate::storage::{DynamicStorage, KeyValueStorage};
use crate::AuthClient;

/// Storage key of the persisted session
pub const SESSION_STORAGE_KEY: &str = "sb-auth-token";

const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Clone)]
pub struct BrowserSessionClient {
    provider: Arc<dyn IdentityProvider>,
    storage: DynamicStorage,
    events: broadcast::Sender<AuthChangeEvent>,
}

impl BrowserSessionClient {
    pub fn new(provider: Arc<dyn IdentityProvider>, storage: DynamicStorage) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            provider,
            storage,
            events,
        }
    }

    pub fn storage(&self) -> &DynamicStorage {
        &self.storage
    }

    /// Publish an auth change to every subscriber
    pub fn emit(&self, event: AuthChangeEvent) {
        tracing::debug!(event = event.name(), "Auth state change");
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn stored_session(&self) -> Option<Session> {
        let raw = self.storage.get_item(SESSION_STORAGE_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable stored session");
                self.storage.remove_item(SESSION_STORAGE_KEY);
                None
            }
        }
    }

    fn store_session(&self, session: &Session) -> Result<(), ProviderError> {
        let json = serde_json::to_string(session)
            .map_err(|e| ProviderError::transport(format!("Failed to serialize session: {}", e)))?;
        self.storage.set_item(SESSION_STORAGE_KEY, &json);
        Ok(())
    }

    fn clear_session(&self) {
        self.storage.remove_item(SESSION_STORAGE_KEY);
    }

    /// Remember-me must be chosen before signing in: the issued tokens land
    /// in whichever storage the preference selects.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
        remember: bool,
    ) -> Result<Session, ProviderError> {
        self.storage.set_remember_me(remember);
        let session = self.provider.sign_in_with_password(email, password).await?;
        self.store_session(&session)?;
        tracing::info!(user_id = %session.user.id, remember, "Signed in");
        self.emit(AuthChangeEvent::SignedIn(session.clone()));
        Ok(session)
    }
}

#[async_trait::async_trait]
impl AuthClient for BrowserSessionClient {
    async fn get_session(&self) -> Result<Option<Session>, ProviderError> {
        let Some(session) = self.stored_session() else {
            return Ok(None);
        };

        if !access_token_expired(&session.access_token) {
            return Ok(Some(session));
        }

        match self.provider.refresh_session(&session.refresh_token).await {
            Ok(refreshed) => {
                self.store_session(&refreshed)?;
                self.emit(AuthChangeEvent::TokenRefreshed(refreshed.clone()));
                Ok(Some(refreshed))
            }
            Err(e) => {
                self.clear_session();
                self.emit(AuthChangeEvent::SignedOut);
                Err(e)
            }
        }
    }

    async fn get_user(&self) -> Result<ProviderUser, ProviderError> {
        let session = self
            .stored_session()
            .ok_or_else(ProviderError::session_missing)?;

        let lookup = self.provider.get_user(&session.tokens()).await?;
        if let Some(refreshed) = &lookup.refreshed {
            self.store_session(refreshed)?;
            self.emit(AuthChangeEvent::TokenRefreshed(refreshed.clone()));
        }
        Ok(lookup.user)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        if let Some(session) = self.stored_session() {
            if let Err(e) = self.provider.sign_out(&session.access_token).await {
                // Local sign-out still happens when the session is already gone upstream
                if e.status != 401 && e.status != 403 && e.status != 404 {
                    return Err(e);
                }
                tracing::debug!(error = %e, "Session already invalid upstream");
            }
        }

        self.clear_session();
        self.emit(AuthChangeEvent::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChangeEvent> {
        self.events.subscribe()
    }
}
