//! MCP tool modules.
//!
//! Tools are grouped by purpose: graph queries and contextual help.

pub mod query;
mod context;
