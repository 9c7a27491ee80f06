//! Auth state provider
//!
//! Mounting hydrates the store once from the cached session and keeps it in
//! sync with auth change events until the returned guard is dropped.

use std::sync::Arc;

use nextbase_supabase::AuthChangeEvent;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::store::AuthStore;
use crate::AuthClient;

pub struct AuthStateProvider;

impl AuthStateProvider {
    /// Must be called inside a tokio runtime
    pub fn mount(store: AuthStore, client: Arc<dyn AuthClient>) -> Mounted {
        // Subscribe before hydrating so no event slips between the two
        let mut events = client.subscribe();

        let hydration = if store.state().is_initialized {
            None
        } else {
            Some(tokio::spawn(hydrate(store.clone(), client)))
        };

        let subscription = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => apply_event(&store, event),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Auth event subscriber lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Mounted {
            hydration,
            subscription,
        }
    }
}

async fn hydrate(store: AuthStore, client: Arc<dyn AuthClient>) {
    match client.get_session().await {
        Ok(session) => {
            store.set_user(session.map(|s| s.user));
            store.set_initialized(true);
        }
        Err(e) => {
            tracing::error!(error = %e, "Error initializing auth");
            store.set_user(None);
            store.set_initialized(true);
        }
    }
    store.set_loading(false);
}

fn apply_event(store: &AuthStore, event: AuthChangeEvent) {
    match &event {
        AuthChangeEvent::SignedIn(session) => {
            tracing::info!(email = ?session.user.email, "User signed in");
        }
        AuthChangeEvent::SignedOut => tracing::info!("User signed out"),
        _ => {}
    }
    store.set_user(event.session().map(|s| s.user.clone()));
}

/// Live mount. Dropping it stops hydration and the event subscription.
pub struct Mounted {
    hydration: Option<JoinHandle<()>>,
    subscription: JoinHandle<()>,
}

impl Mounted {
    /// Wait for the initial hydration, if one was started
    pub async fn hydrated(&mut self) {
        if let Some(handle) = self.hydration.as_mut() {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Auth hydration task failed");
            }
            self.hydration = None;
        }
    }

    pub fn unmount(self) {}
}

impl Drop for Mounted {
    fn drop(&mut self) {
        if let Some(handle) = self.hydration.take() {
            handle.abort();
        }
        self.subscription.abort();
    }
}
