//! Public and protected procedures

use std::future::Future;

use axum::Json;
use serde::Serialize;

use crate::context::{ProtectedContext, RpcContext};
use crate::error::RpcError;

/// Success envelope: `{"success": true, "data": ...}`
#[derive(Debug, Clone, Serialize)]
pub struct RpcResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> RpcResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

pub type RpcResult<T> = Result<Json<RpcResponse<T>>, RpcError>;

/// Run a procedure that needs no authentication
pub async fn public<F, Fut, T>(ctx: RpcContext, handler: F) -> Result<T, RpcError>
where
    F: FnOnce(RpcContext) -> Fut,
    Fut: Future<Output = Result<T, RpcError>>,
{
    handler(ctx).await
}

/// Run a procedure only when the request carries an authenticated identity.
/// `handler` is never invoked otherwise.
pub async fn protected<F, Fut, T>(ctx: RpcContext, handler: F) -> Result<T, RpcError>
where
    F: FnOnce(ProtectedContext) -> Fut,
    Fut: Future<Output = Result<T, RpcError>>,
{
    let ctx = ctx.protect()?;
    handler(ctx).await
}
