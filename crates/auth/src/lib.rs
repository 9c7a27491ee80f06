//! Session propagation for Nextbase
//!
//! Provides the session middleware that turns session cookies into an
//! `x-user-info` identity header, the reader that decodes it, and axum
//! extractors on top of the reader.

mod backend;
mod config;
mod cookies;
mod error;
mod extractors;
mod identity;
mod middleware;
pub mod reader;

pub use backend::{AuthBackend, SessionResolution};
pub use config::{AuthConfig, DEFAULT_ACCESS_TOKEN_COOKIE, DEFAULT_REFRESH_TOKEN_COOKIE};
pub use cookies::{clear_session_cookies, session_cookies, session_tokens};
pub use error::AuthError;
pub use extractors::{CurrentIdentity, RequireAuth};
pub use identity::{AuthenticatedUser, IdentityDescriptor, USER_INFO_HEADER};
pub use middleware::session_middleware;
pub use reader::{AuthCheck, DetailedIdentity};
