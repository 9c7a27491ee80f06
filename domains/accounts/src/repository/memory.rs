//! In-memory user store for tests and local development without a database

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use nextbase_common::RepositoryError;

use super::users::UserStore;
use crate::domain::entities::{NewUser, User};

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<String, User>,
    fail_inserts: bool,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent insert fail with a connection error
    pub fn fail_inserts(&self, fail: bool) {
        self.state.lock().unwrap().fail_inserts = fail;
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_inserts {
            return Err(RepositoryError::Connection(sqlx::Error::PoolTimedOut));
        }
        let duplicate = state
            .users
            .values()
            .any(|u| u.id == user.id || u.email == user.email);
        if duplicate {
            return Err(RepositoryError::AlreadyExists);
        }

        let user = user.into_user(Utc::now());
        state.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.state.lock().unwrap().users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}
