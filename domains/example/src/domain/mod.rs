//! Domain layer for the example resource

pub mod entities;
