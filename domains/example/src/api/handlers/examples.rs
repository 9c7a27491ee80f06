//! Example procedures
//!
//! - GET /api/rpc/example.getAll - Page through examples, newest first (public)
//! - GET /api/rpc/example.getById - Fetch one example (public)
//! - POST /api/rpc/example.create - Create an example (protected)
//! - POST /api/rpc/example.update - Partially update an example (protected)
//! - POST /api/rpc/example.delete - Delete an example, returning it (protected)
//!
//! Protected writes reject anonymous callers before validating their input.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use nextbase_common::{Pagination, ValidatedJson, ValidatedQuery};
use nextbase_rpc::{protected, public, Protected, RpcContext, RpcError, RpcResponse, RpcResult};
use serde::Deserialize;
use validator::Validate;

use crate::api::middleware::ExampleState;
use crate::domain::entities::{
    generate_example_id, Example, ExampleChanges, ExampleStatus, NewExample,
};

const NOT_FOUND_MESSAGE: &str = "Example not found";

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct ExampleIdInput {
    #[validate(length(min = 1))]
    pub id: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExampleInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    pub description: Option<String>,

    #[serde(default)]
    pub status: ExampleStatus,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub display_order: i32,

    pub metadata: Option<serde_json::Value>,
}

impl CreateExampleInput {
    fn into_new_example(self, id: String) -> NewExample {
        NewExample {
            id,
            title: self.title,
            description: self.description,
            status: self.status,
            is_active: self.is_active,
            display_order: self.display_order,
            metadata: self.metadata,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExampleInput {
    #[validate(length(min = 1))]
    pub id: String,

    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,

    pub description: Option<String>,

    pub status: Option<ExampleStatus>,

    pub is_active: Option<bool>,

    pub display_order: Option<i32>,

    pub metadata: Option<serde_json::Value>,
}

impl UpdateExampleInput {
    fn into_parts(self) -> (String, ExampleChanges) {
        let changes = ExampleChanges {
            title: self.title,
            description: self.description,
            status: self.status,
            is_active: self.is_active,
            display_order: self.display_order,
            metadata: self.metadata,
        };
        (self.id, changes)
    }
}

pub async fn get_all(
    State(state): State<ExampleState>,
    ctx: RpcContext,
    ValidatedQuery(page): ValidatedQuery<Pagination>,
) -> RpcResult<Vec<Example>> {
    public(ctx, |_ctx| async move {
        let examples = state
            .store
            .list(page.limit(), page.offset())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to list examples");
                RpcError::internal("Failed to fetch examples")
            })?;
        Ok(RpcResponse::ok(examples))
    })
    .await
}

pub async fn get_by_id(
    State(state): State<ExampleState>,
    ctx: RpcContext,
    ValidatedQuery(input): ValidatedQuery<ExampleIdInput>,
) -> RpcResult<Example> {
    public(ctx, |_ctx| async move {
        let example = state.store.get(&input.id).await.map_err(|e| {
            tracing::error!(error = %e, example_id = %input.id, "Failed to fetch example");
            RpcError::internal("Failed to fetch example")
        })?;
        example
            .map(RpcResponse::ok)
            .ok_or_else(|| RpcError::not_found(NOT_FOUND_MESSAGE))
    })
    .await
}

pub async fn create(
    State(state): State<ExampleState>,
    Protected(ctx): Protected,
    ValidatedJson(input): ValidatedJson<CreateExampleInput>,
) -> RpcResult<Example> {
    let example = state
        .store
        .create(input.into_new_example(generate_example_id()))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %ctx.user_id, "Failed to create example");
            RpcError::internal("Failed to create example")
        })?;

    tracing::info!(example_id = %example.id, user_id = %ctx.user_id, "Example created");
    Ok(RpcResponse::ok(example))
}

pub async fn update(
    State(state): State<ExampleState>,
    Protected(ctx): Protected,
    ValidatedJson(input): ValidatedJson<UpdateExampleInput>,
) -> RpcResult<Example> {
    let (id, changes) = input.into_parts();
    let updated = state.store.update(&id, changes).await.map_err(|e| {
        tracing::error!(error = %e, example_id = %id, user_id = %ctx.user_id, "Failed to update example");
        RpcError::internal("Failed to update example")
    })?;

    updated
        .map(RpcResponse::ok)
        .ok_or_else(|| RpcError::not_found(NOT_FOUND_MESSAGE))
}

/// Goes through `protected` so the identity check runs before the body is
/// looked at, malformed or not.
pub async fn delete(
    State(state): State<ExampleState>,
    ctx: RpcContext,
    body: Result<Json<ExampleIdInput>, JsonRejection>,
) -> RpcResult<Example> {
    protected(ctx, |ctx| async move {
        let Json(input) = body.map_err(|e| RpcError::bad_request(e.body_text()))?;
        input
            .validate()
            .map_err(|e| RpcError::bad_request(format!("Validation failed: {}", e)))?;

        let deleted = state.store.delete(&input.id).await.map_err(|e| {
            tracing::error!(error = %e, example_id = %input.id, user_id = %ctx.user_id, "Failed to delete example");
            RpcError::internal("Failed to delete example")
        })?;

        if deleted.is_some() {
            tracing::info!(example_id = %input.id, user_id = %ctx.user_id, "Example deleted");
        }
        deleted
            .map(RpcResponse::ok)
            .ok_or_else(|| RpcError::not_found(NOT_FOUND_MESSAGE))
    })
    .await
}
