//! Shared utilities, configuration, and error handling for Nextbase
//!
//! This crate provides common functionality used across the Nextbase workspace:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - Validating request extractors (JSON body, query string, pagination)

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;

pub use config::Config;
pub use db::RepositoryError;
pub use error::{Error, Result};
pub use extractors::{InputRejection, Pagination, ValidatedJson, ValidatedQuery};
