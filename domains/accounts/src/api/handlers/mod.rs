//! HTTP handlers for the accounts API

pub mod auth;
