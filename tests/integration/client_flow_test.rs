//! Client identity: remember-me storage selection, store hydration and
//! live updates from auth events.

use std::sync::Arc;
use std::time::Duration;

use nextbase_client::{
    get_remember_me_preference, sign_out, AuthClient, AuthState, AuthStateProvider, AuthStore,
    BrowserSessionClient, DynamicStorage, KeyValueStorage, MemoryStorage, SESSION_STORAGE_KEY,
};
use nextbase_supabase::MockIdentityProvider;

const PASSWORD: &str = "Secret123";

struct ClientHarness {
    provider: MockIdentityProvider,
    durable: MemoryStorage,
    ephemeral: MemoryStorage,
    client: Arc<BrowserSessionClient>,
}

fn harness() -> ClientHarness {
    let provider = MockIdentityProvider::new();
    provider.add_user("alice@example.com", PASSWORD, Some("Alice"));

    let durable = MemoryStorage::new();
    let ephemeral = MemoryStorage::new();
    let storage = DynamicStorage::new(Arc::new(durable.clone()), Arc::new(ephemeral.clone()));
    let client = Arc::new(BrowserSessionClient::new(
        Arc::new(provider.clone()),
        storage,
    ));

    ClientHarness {
        provider,
        durable,
        ephemeral,
        client,
    }
}

async fn wait_for(store: &AuthStore, predicate: impl FnMut(&AuthState) -> bool) {
    let mut rx = store.subscribe();
    tokio::time::timeout(Duration::from_secs(1), rx.wait_for(predicate))
        .await
        .expect("store did not reach the expected state")
        .expect("store closed");
}

#[tokio::test]
async fn test_browser_session_sign_in_uses_ephemeral_storage() {
    let h = harness();

    h.client
        .sign_in_with_password("alice@example.com", PASSWORD, false)
        .await
        .unwrap();

    assert!(!get_remember_me_preference(&h.durable));
    assert!(h.ephemeral.get_item(SESSION_STORAGE_KEY).is_some());
    assert!(h.durable.get_item(SESSION_STORAGE_KEY).is_none());
}

#[tokio::test]
async fn test_remembered_sign_in_uses_durable_storage() {
    let h = harness();

    h.client
        .sign_in_with_password("alice@example.com", PASSWORD, true)
        .await
        .unwrap();

    assert!(get_remember_me_preference(&h.durable));
    assert!(h.durable.get_item(SESSION_STORAGE_KEY).is_some());
    assert!(h.ephemeral.get_item(SESSION_STORAGE_KEY).is_none());
}

#[tokio::test]
async fn test_store_follows_sign_in_and_sign_out_events() {
    let h = harness();
    let store = AuthStore::new();
    let mut mounted = AuthStateProvider::mount(store.clone(), h.client.clone());
    mounted.hydrated().await;

    let state = store.state();
    assert!(state.is_initialized);
    assert!(!state.is_loading);
    assert!(state.user.is_none());

    h.client
        .sign_in_with_password("alice@example.com", PASSWORD, true)
        .await
        .unwrap();
    wait_for(&store, |s| s.user.is_some()).await;
    assert_eq!(
        store.state().user.unwrap().email.as_deref(),
        Some("alice@example.com")
    );

    sign_out(h.client.as_ref(), &store).await.unwrap();
    assert!(store.state().user.is_none());
    assert!(store.state().is_initialized);
    assert!(h.durable.get_item(SESSION_STORAGE_KEY).is_none());
    assert_eq!(h.provider.call_count("sign_out"), 1);

    mounted.unmount();
}

#[tokio::test]
async fn test_mount_hydrates_from_stored_session() {
    let h = harness();
    h.client
        .sign_in_with_password("alice@example.com", PASSWORD, true)
        .await
        .unwrap();

    let store = AuthStore::new();
    let mut mounted = AuthStateProvider::mount(store.clone(), h.client.clone());
    mounted.hydrated().await;

    assert_eq!(
        store.state().user.and_then(|u| u.email),
        Some("alice@example.com".to_string())
    );
    // Hydration reads the cached session; no verification round-trip
    assert_eq!(h.provider.call_count("get_user"), 0);
}

#[tokio::test]
async fn test_expired_stored_session_is_refreshed_on_hydration() {
    let h = harness();
    h.client.storage().set_remember_me(true);
    let expired = h
        .provider
        .issue_expired_session("alice@example.com")
        .unwrap();
    h.durable.set_item(
        SESSION_STORAGE_KEY,
        &serde_json::to_string(&expired).unwrap(),
    );

    let session = h.client.get_session().await.unwrap().unwrap();
    assert_ne!(session.access_token, expired.access_token);
    assert_eq!(h.provider.call_count("refresh_session"), 1);

    // The refresh token was single use; the rotated pair is what is stored now
    let stored = h.durable.get_item(SESSION_STORAGE_KEY).unwrap();
    assert!(stored.contains(&session.refresh_token));
}
