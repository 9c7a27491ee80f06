//! Accounts domain state and auth backend integration

use axum::extract::FromRef;
use nextbase_auth::AuthBackend;

use crate::actions::AccountActions;

/// Application state for the accounts domain
#[derive(Clone)]
pub struct AccountsState {
    pub actions: AccountActions,
    pub auth: AuthBackend,
}

impl FromRef<AccountsState> for AuthBackend {
    fn from_ref(state: &AccountsState) -> Self {
        state.auth.clone()
    }
}
