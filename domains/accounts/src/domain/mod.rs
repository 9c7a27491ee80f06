//! Domain layer for accounts

pub mod entities;
pub mod error;
pub mod forms;
pub mod messages;
