//! Accounts domain: signup, login, logout, password reset, email confirmation

pub mod actions;
pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::*;
pub use domain::error::{ActionError, ActionSuccess};
pub use domain::forms::{
    ConfirmParams, LoginForm, ResetPasswordForm, SignupForm, UpdatePasswordForm,
};

pub use actions::{AccountActions, ConfirmOutcome};
pub use repository::{AccountsRepositories, InMemoryUserStore, UserRepository, UserStore};

// Re-export API types
pub use api::routes;
pub use api::AccountsState;
