//! Repository implementations for the accounts domain

pub mod memory;
pub mod users;

use std::sync::Arc;

use sqlx::PgPool;

pub use memory::InMemoryUserStore;
pub use users::{UserRepository, UserStore};

/// Combined repository access for the accounts domain
#[derive(Clone)]
pub struct AccountsRepositories {
    pub users: Arc<dyn UserStore>,
}

impl AccountsRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self::with_users(Arc::new(UserRepository::new(pool)))
    }

    pub fn with_users(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }
}
