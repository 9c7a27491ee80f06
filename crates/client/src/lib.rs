//! Client-side identity for Nextbase
//!
//! - `AuthStore`: reactive identity store
//! - `AuthStateProvider`: one-time hydration plus auth event subscription
//! - `DynamicStorage`: remember-me driven token storage
//! - `BrowserSessionClient`: provider client persisting its session through `DynamicStorage`

mod helpers;
mod provider;
mod session_client;
mod storage;
mod store;

use nextbase_supabase::{AuthChangeEvent, ProviderError, ProviderUser, Session};
use tokio::sync::broadcast;

pub use helpers::{get_user, refresh_auth, sign_out};
pub use provider::{AuthStateProvider, Mounted};
pub use session_client::{BrowserSessionClient, SESSION_STORAGE_KEY};
pub use storage::{
    get_remember_me_preference, set_remember_me_preference, DynamicStorage, KeyValueStorage,
    MemoryStorage, REMEMBER_ME_KEY,
};
pub use store::{AuthState, AuthStore};

/// Provider operations the client side relies on
#[async_trait::async_trait]
pub trait AuthClient: Send + Sync {
    /// Cached session; only touches the network to refresh an expired token
    async fn get_session(&self) -> Result<Option<Session>, ProviderError>;

    /// User verified with the provider
    async fn get_user(&self) -> Result<ProviderUser, ProviderError>;

    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Auth change events from now on
    fn subscribe(&self) -> broadcast::Receiver<AuthChangeEvent>;
}
