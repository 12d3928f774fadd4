use codeinsight_core::control::ToolName;
use codeinsight_core::embed::Embedder;
use codeinsight_core::store::GraphStore;
use codeinsight_store::schema::{NODE_LABELS, RELATIONSHIP_TYPES};
use rmcp::{
    ErrorData,
    model::{CallToolResult, Content},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::CodeInsightMcp;

/// Payload listing the MCP commands served by code-insight, plus the graph
/// vocabulary their results use.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HelpCommands {
    pub commands: Vec<String>,
    pub node_labels: Vec<String>,
    pub relationship_types: Vec<String>,
}

impl Default for HelpCommands {
    fn default() -> Self {
        let mut commands = vec![
            "help - List the MCP commands served by code-insight.".to_string(),
            "health - Health check. Returns 'ok'.".to_string(),
        ];
        commands.extend(
            ToolName::ALL
                .into_iter()
                .map(|tool| format!("{tool} - {}", tool.description())),
        );
        Self {
            commands,
            node_labels: NODE_LABELS.iter().map(ToString::to_string).collect(),
            relationship_types: RELATIONSHIP_TYPES.iter().map(ToString::to_string).collect(),
        }
    }
}

#[tool_router(router = tool_router_context, vis = "pub")]
impl<S: GraphStore, E: Embedder> CodeInsightMcp<S, E> {
    #[tool(description = "List the MCP commands served by code-insight with their arguments.")]
    async fn help(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::json(HelpCommands::default())?]))
    }
}
