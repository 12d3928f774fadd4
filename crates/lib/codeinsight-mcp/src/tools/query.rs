use codeinsight_core::control::{
    GetNeighborsArgs,
    GetNodeArgs,
    GetRelationshipsArgs,
    SearchCodeArgs,
};
use codeinsight_core::embed::Embedder;
use codeinsight_core::store::GraphStore;
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::{CodeInsightMcp, helpers};

/// Parameters for a semantic code search.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SearchCodeParams {
    /// Natural-language question about the code.
    pub question: String,
    /// Number of hits to return; defaults to 5.
    pub top_k: Option<i64>,
}

/// Parameters naming a single node.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct NodeNameParams {
    pub node_name: String,
}

/// Parameters for a bounded neighborhood walk.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetNeighborsParams {
    pub node_name: String,
    /// Maximum number of hops; defaults to 1.
    pub depth: Option<i64>,
}

impl From<SearchCodeParams> for SearchCodeArgs {
    fn from(params: SearchCodeParams) -> Self {
        Self {
            question: params.question,
            top_k: params.top_k,
        }
    }
}

impl From<GetNeighborsParams> for GetNeighborsArgs {
    fn from(params: GetNeighborsParams) -> Self {
        Self {
            node_name: params.node_name,
            depth: params.depth,
        }
    }
}

#[tool_router(router = tool_router_query, vis = "pub")]
impl<S: GraphStore, E: Embedder> CodeInsightMcp<S, E> {
    #[tool(description = "Semantic search over indexed code. Returns up to top_k hits with name, code, filePath, and score, most similar first.")]
    async fn search_code(
        &self,
        Parameters(params): Parameters<SearchCodeParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let hits = self
            .dispatcher()
            .search_code(params.into())
            .await
            .map_err(|err| helpers::tool_err(&err))?;
        Ok(CallToolResult::success(vec![Content::json(hits)?]))
    }

    #[tool(description = "Fetch all properties of a node by name. Unknown names report status not_found.")]
    async fn get_node(
        &self,
        Parameters(params): Parameters<NodeNameParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let lookup = self
            .dispatcher()
            .get_node(GetNodeArgs {
                node_name: params.node_name,
            })
            .await
            .map_err(|err| helpers::tool_err(&err))?;
        Ok(CallToolResult::success(vec![Content::json(lookup)?]))
    }

    #[tool(description = "List outgoing relationships of a node with each target's name and labels.")]
    async fn get_relationships(
        &self,
        Parameters(params): Parameters<NodeNameParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let relationships = self
            .dispatcher()
            .get_relationships(GetRelationshipsArgs {
                node_name: params.node_name,
            })
            .await
            .map_err(|err| helpers::tool_err(&err))?;
        Ok(CallToolResult::success(vec![Content::json(relationships)?]))
    }

    #[tool(description = "List nodes connected within depth hops in either direction, each with the relationship types along one path.")]
    async fn get_neighbors(
        &self,
        Parameters(params): Parameters<GetNeighborsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let neighbors = self
            .dispatcher()
            .get_neighbors(params.into())
            .await
            .map_err(|err| helpers::tool_err(&err))?;
        Ok(CallToolResult::success(vec![Content::json(neighbors)?]))
    }
}
