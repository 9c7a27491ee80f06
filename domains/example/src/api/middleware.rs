//! Example domain state and auth backend integration

use std::sync::Arc;

use axum::extract::FromRef;
use nextbase_auth::AuthBackend;

use crate::repository::ExampleStore;

#[derive(Clone)]
pub struct ExampleState {
    pub store: Arc<dyn ExampleStore>,
    pub auth: AuthBackend,
}

impl FromRef<ExampleState> for AuthBackend {
    fn from_ref(state: &ExampleState) -> Self {
        state.auth.clone()
    }
}
