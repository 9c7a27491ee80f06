//! Client identity store
//!
//! Whole-state writes go through a `watch` channel, so every subscriber
//! sees consistent snapshots. The store is passed explicitly to whoever
//! needs it; cloning shares the same state.

use std::sync::Arc;

use nextbase_supabase::ProviderUser;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<ProviderUser>,
    pub is_loading: bool,
    pub is_initialized: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            is_loading: true,
            is_initialized: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthStore {
    state: Arc<watch::Sender<AuthState>>,
}

impl Default for AuthStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self {
            state: Arc::new(state),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Set the user and finish loading
    pub fn set_user(&self, user: Option<ProviderUser>) {
        self.state.send_modify(|s| {
            s.user = user;
            s.is_loading = false;
        });
    }

    pub fn set_loading(&self, is_loading: bool) {
        self.state.send_modify(|s| s.is_loading = is_loading);
    }

    pub fn set_initialized(&self, is_initialized: bool) {
        self.state.send_modify(|s| s.is_initialized = is_initialized);
    }

    /// Clear the user; initialization status is kept
    pub fn logout(&self) {
        self.state.send_modify(|s| {
            s.user = None;
            s.is_loading = false;
        });
    }

    pub fn reset(&self) {
        self.state.send_replace(AuthState::default());
    }
}
