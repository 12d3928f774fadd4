//! Core query layer for code-insight.
//!
//! This crate owns the tool dispatcher, the query builder that turns tool
//! arguments into graph queries, the result shaper, and the adapters for the
//! graph store (`SurrealDB`) and the embedding service.

pub mod control;
pub mod embed;
pub mod query;
pub mod shape;
pub mod store;
