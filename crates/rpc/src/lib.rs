//! RPC layer for Nextbase
//!
//! Per-request context with a lazily created provider session, public and
//! protected procedures, and the RPC error kinds.

mod context;
mod error;
mod procedure;

pub use context::{Protected, ProtectedContext, ProviderSession, RpcContext};
pub use error::{RpcError, RpcErrorCode};
pub use procedure::{protected, public, RpcResponse, RpcResult};
