//! Typed per-tool arguments and their conversion from loosely typed JSON.

use serde_json::{Map, Value};

use super::ToolError;

pub type ToolArgs = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCodeArgs {
    pub question: String,
    pub top_k: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetNodeArgs {
    pub node_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetRelationshipsArgs {
    pub node_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetNeighborsArgs {
    pub node_name: String,
    pub depth: Option<i64>,
}

impl TryFrom<&ToolArgs> for SearchCodeArgs {
    type Error = ToolError;

    fn try_from(args: &ToolArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            question: required_string(args, "question")?,
            top_k: optional_integer(args, "top_k")?,
        })
    }
}

impl TryFrom<&ToolArgs> for GetNodeArgs {
    type Error = ToolError;

    fn try_from(args: &ToolArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            node_name: required_string(args, "node_name")?,
        })
    }
}

impl TryFrom<&ToolArgs> for GetRelationshipsArgs {
    type Error = ToolError;

    fn try_from(args: &ToolArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            node_name: required_string(args, "node_name")?,
        })
    }
}

impl TryFrom<&ToolArgs> for GetNeighborsArgs {
    type Error = ToolError;

    fn try_from(args: &ToolArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            node_name: required_string(args, "node_name")?,
            depth: optional_integer(args, "depth")?,
        })
    }
}

/// Rejects blank text arguments; returns the value unchanged otherwise.
pub(crate) fn ensure_non_empty<'a>(value: &'a str, field: &str) -> Result<&'a str, ToolError> {
    if value.trim().is_empty() {
        return Err(ToolError::InvalidArgument(format!("{field} must not be empty")));
    }
    Ok(value)
}

fn required_string(args: &ToolArgs, field: &str) -> Result<String, ToolError> {
    match args.get(field) {
        None | Some(Value::Null) => Err(ToolError::InvalidArgument(format!(
            "missing required argument: {field}"
        ))),
        Some(Value::String(value)) => Ok(ensure_non_empty(value, field)?.to_string()),
        Some(_) => Err(ToolError::InvalidArgument(format!(
            "{field} must be a string"
        ))),
    }
}

fn optional_integer(args: &ToolArgs, field: &str) -> Result<Option<i64>, ToolError> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_i64().map(Some).ok_or_else(|| {
            ToolError::InvalidArgument(format!("{field} must be an integer"))
        }),
    }
}
