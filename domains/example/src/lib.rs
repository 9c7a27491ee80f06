//! Example resource: public reads and protected writes over the `example` table

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::*;

pub use repository::{ExampleRepository, ExampleStore, InMemoryExampleStore};

// Re-export API types
pub use api::routes;
pub use api::ExampleState;
