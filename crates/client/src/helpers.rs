//! Client auth helpers

use nextbase_supabase::{ProviderError, ProviderUser};

use crate::store::AuthStore;
use crate::AuthClient;

/// Current user, verified with the provider
pub async fn get_user(client: &dyn AuthClient) -> Result<ProviderUser, ProviderError> {
    client.get_user().await.map_err(|e| {
        tracing::error!(error = %e, "Error getting user");
        e
    })
}

/// Sign out with the provider, then clear the store
pub async fn sign_out(client: &dyn AuthClient, store: &AuthStore) -> Result<(), ProviderError> {
    client.sign_out().await.map_err(|e| {
        tracing::error!(error = %e, "Sign out failed");
        e
    })?;
    store.logout();
    Ok(())
}

/// Re-read the user from the provider into the store. Failures clear the user.
pub async fn refresh_auth(
    client: &dyn AuthClient,
    store: &AuthStore,
) -> Result<ProviderUser, ProviderError> {
    match client.get_user().await {
        Ok(user) => {
            store.set_user(Some(user.clone()));
            Ok(user)
        }
        Err(e) => {
            tracing::error!(error = %e, "Error refreshing auth");
            store.set_user(None);
            Err(e)
        }
    }
}
