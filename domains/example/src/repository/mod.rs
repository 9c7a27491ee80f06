//! Repository implementations for the example resource

pub mod examples;
pub mod memory;

pub use examples::{ExampleRepository, ExampleStore};
pub use memory::InMemoryExampleStore;
