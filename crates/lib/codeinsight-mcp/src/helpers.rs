use std::borrow::Cow;

use codeinsight_core::control::ToolError;
use rmcp::ErrorData;
use rmcp::model::ErrorCode;
use serde_json::json;

pub(crate) fn mcp_err(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> ErrorData {
    ErrorData {
        code,
        message: message.into(),
        data: None,
    }
}

/// Maps a tool failure onto a JSON-RPC error, keeping its category in `data.kind`.
pub(crate) fn tool_err(err: &ToolError) -> ErrorData {
    let code = match err {
        ToolError::InvalidArgument(_) => ErrorCode::INVALID_PARAMS,
        ToolError::UnknownTool(_) => ErrorCode::METHOD_NOT_FOUND,
        ToolError::EmbeddingFailure(_) | ToolError::Backend(_) | ToolError::Timeout(_) => {
            ErrorCode::INTERNAL_ERROR
        }
    };
    let mut data = mcp_err(code, err.to_string());
    data.data = Some(json!({ "kind": err.kind() }));
    data
}
