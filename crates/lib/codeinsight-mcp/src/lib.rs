//! MCP server implementation for code-insight.
//!
//! This crate wires the tool dispatcher into rmcp tool handlers and exposes
//! the same tools over a plain JSON HTTP surface.

mod helpers;
mod tools;
pub mod http;
pub mod server;

use std::sync::Arc;

use codeinsight_core::control::ToolDispatcher;
use codeinsight_core::embed::Embedder;
use codeinsight_core::store::GraphStore;
use rmcp::{
    ErrorData,
    ServerHandler,
    handler::server::tool::ToolRouter,
    tool,
    tool_handler,
    tool_router,
};
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};

const SERVER_INSTRUCTIONS: &str = r"code-insight answers questions about a codebase indexed as a graph of code elements.

Nodes are classes, records, interfaces, types, methods, attributes, variables, conditions,
exceptions, and diagnostics. Edges carry a relationship type such as `CALLS`, `INHERITS`,
`IMPLEMENTS`, `DEPENDS_ON`, `HAS_ATTRIBUTE`, `READS_VARIABLE`, `HAS_CONDITION`, `CATCHES`,
`RETURNS`, `HAS_PARAMETER`, or `HAS_ISSUE`.

Workflow:
1. Start with `search_code` and a natural-language question to find candidate nodes.
2. Inspect a hit with `get_node` using its `name`.
3. Follow structure with `get_relationships` (outgoing edges only) or `get_neighbors`
   (either direction, up to `depth` hops).

Notes:
- `get_node` reports `status: not_found` for unknown names instead of failing.
- `get_neighbors` reports one path of relationship types per neighbor.
- Use `help` for argument details. `health` returns `ok`.";

/// MCP server wrapper around a shared tool dispatcher.
pub struct CodeInsightMcp<S: GraphStore, E: Embedder> {
    tool_router: ToolRouter<Self>,
    dispatcher: Arc<ToolDispatcher<S, E>>,
}

impl<S: GraphStore, E: Embedder> Clone for CodeInsightMcp<S, E> {
    fn clone(&self) -> Self {
        Self {
            tool_router: self.tool_router.clone(),
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl<S: GraphStore, E: Embedder> CodeInsightMcp<S, E> {
    /// Creates a new server owning its dispatcher.
    #[must_use]
    pub fn new(dispatcher: ToolDispatcher<S, E>) -> Self {
        Self::with_dispatcher(Arc::new(dispatcher))
    }

    /// Creates a new server using a shared dispatcher handle.
    #[must_use]
    pub fn with_dispatcher(dispatcher: Arc<ToolDispatcher<S, E>>) -> Self {
        let tool_router =
            Self::tool_router_core() + Self::tool_router_query() + Self::tool_router_context();
        Self {
            tool_router,
            dispatcher,
        }
    }

    pub(crate) fn dispatcher(&self) -> &ToolDispatcher<S, E> {
        &self.dispatcher
    }
}

#[tool_router(router = tool_router_core, vis = "pub")]
impl<S: GraphStore, E: Embedder> CodeInsightMcp<S, E> {
    #[tool(description = "Health check. Returns 'ok'.")]
    async fn health(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text("ok")]))
    }
}

#[tool_handler]
impl<S: GraphStore, E: Embedder> ServerHandler for CodeInsightMcp<S, E> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
