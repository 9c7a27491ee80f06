//! Route definitions for the example procedures

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::examples;
use super::middleware::ExampleState;

/// Create all example procedure routes
pub fn routes() -> Router<ExampleState> {
    Router::new()
        .route("/api/rpc/example.getAll", get(examples::get_all))
        .route("/api/rpc/example.getById", get(examples::get_by_id))
        .route("/api/rpc/example.create", post(examples::create))
        .route("/api/rpc/example.update", post(examples::update))
        .route("/api/rpc/example.delete", post(examples::delete))
}
