//! HTTP handlers for the example procedures

pub mod examples;
