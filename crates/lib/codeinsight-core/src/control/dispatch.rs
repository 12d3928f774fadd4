use std::time::Duration;

use tracing::debug;

use super::args::ToolArgs;
use super::{
    GetNeighborsArgs,
    GetNodeArgs,
    GetRelationshipsArgs,
    SearchCodeArgs,
    ToolDispatcher,
    ToolError,
    ToolName,
    ToolOutput,
};
use crate::embed::Embedder;
use crate::store::GraphStore;

impl<S: GraphStore, E: Embedder> ToolDispatcher<S, E> {
    /// Routes a named tool call with JSON arguments under the configured deadline.
    ///
    /// # Errors
    /// Returns `UnknownTool` for an unrecognized name, `InvalidArgument` for
    /// missing or malformed arguments, or the error of the operation itself.
    pub async fn dispatch(&self, tool_name: &str, args: &ToolArgs) -> Result<ToolOutput, ToolError> {
        self.dispatch_with_deadline(tool_name, args, None).await
    }

    /// Routes a named tool call, bounding it by `deadline` when given and by
    /// the configured timeout otherwise.
    ///
    /// # Errors
    /// Same as [`ToolDispatcher::dispatch`], plus `Timeout` once the deadline
    /// passes.
    pub async fn dispatch_with_deadline(
        &self,
        tool_name: &str,
        args: &ToolArgs,
        deadline: Option<Duration>,
    ) -> Result<ToolOutput, ToolError> {
        let tool: ToolName = tool_name.parse()?;
        debug!(tool = %tool, "dispatching tool call");
        match tool {
            ToolName::SearchCode => {
                let args = SearchCodeArgs::try_from(args)?;
                self.bounded(deadline, async {
                    self.run_search_code(args).await.map(ToolOutput::SearchHits)
                })
                .await
            }
            ToolName::GetNode => {
                let args = GetNodeArgs::try_from(args)?;
                self.bounded(deadline, async {
                    self.run_get_node(args).await.map(ToolOutput::Node)
                })
                .await
            }
            ToolName::GetRelationships => {
                let args = GetRelationshipsArgs::try_from(args)?;
                self.bounded(deadline, async {
                    self.run_get_relationships(args)
                        .await
                        .map(ToolOutput::Relationships)
                })
                .await
            }
            ToolName::GetNeighbors => {
                let args = GetNeighborsArgs::try_from(args)?;
                self.bounded(deadline, async {
                    self.run_get_neighbors(args).await.map(ToolOutput::Neighbors)
                })
                .await
            }
        }
    }
}
