//! API layer for the example resource

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::ExampleState;
pub use routes::routes;
