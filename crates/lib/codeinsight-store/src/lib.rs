//! Graph data model and schema helpers for code-insight.
//!
//! This crate defines the response records shared by the query layer, the
//! tool servers, and storage adapters.

pub mod models;
pub mod schema;

pub use models::*;
