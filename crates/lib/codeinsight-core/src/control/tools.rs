use codeinsight_store::{NeighborView, NodeLookup, RelationshipView, SearchHit};
use tracing::{debug, warn};

use super::args::ensure_non_empty;
use super::{
    GetNeighborsArgs,
    GetNodeArgs,
    GetRelationshipsArgs,
    SearchCodeArgs,
    ToolDispatcher,
    ToolError,
};
use crate::embed::Embedder;
use crate::query::{DEFAULT_DEPTH, DEFAULT_TOP_K, Depth, TopK};
use crate::shape;
use crate::store::{GraphQuery, GraphStore, Record};

impl<S: GraphStore, E: Embedder> ToolDispatcher<S, E> {
    /// Finds the nodes most similar to a natural-language question.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for a blank question or out-of-range `top_k`
    /// before the embedder is called, `EmbeddingFailure` if embedding fails,
    /// `Backend` if the query fails, and `Timeout` past the deadline.
    pub async fn search_code(&self, args: SearchCodeArgs) -> Result<Vec<SearchHit>, ToolError> {
        self.bounded(None, self.run_search_code(args)).await
    }

    /// Looks up a node by name.
    ///
    /// A missing node is reported as `NodeLookup::NotFound`, not as an error.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for a blank name, `Backend` if the query
    /// fails, and `Timeout` past the deadline.
    pub async fn get_node(&self, args: GetNodeArgs) -> Result<NodeLookup, ToolError> {
        self.bounded(None, self.run_get_node(args)).await
    }

    /// Lists the outgoing relationships of a node; unknown nodes have none.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for a blank name, `Backend` if the query
    /// fails, and `Timeout` past the deadline.
    pub async fn get_relationships(
        &self,
        args: GetRelationshipsArgs,
    ) -> Result<Vec<RelationshipView>, ToolError> {
        self.bounded(None, self.run_get_relationships(args)).await
    }

    /// Lists the nodes reachable from a node within `depth` undirected hops.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for a blank name or out-of-range `depth`,
    /// `Backend` if the query fails, and `Timeout` past the deadline.
    pub async fn get_neighbors(
        &self,
        args: GetNeighborsArgs,
    ) -> Result<Vec<NeighborView>, ToolError> {
        self.bounded(None, self.run_get_neighbors(args)).await
    }

    pub(super) async fn run_search_code(
        &self,
        args: SearchCodeArgs,
    ) -> Result<Vec<SearchHit>, ToolError> {
        let question = ensure_non_empty(&args.question, "question")?;
        let top_k = TopK::new(
            args.top_k.unwrap_or(i64::from(DEFAULT_TOP_K)),
            self.config.max_top_k,
        )?;

        let embedding = self.embedder.embed(question).await.map_err(|err| {
            warn!(error = %err, "embedding failed");
            ToolError::from(err)
        })?;
        let query = self.builder.semantic_search(&embedding, top_k);
        let records = self.execute(&query).await?;
        Ok(shape::search_hits(records)?)
    }

    pub(super) async fn run_get_node(&self, args: GetNodeArgs) -> Result<NodeLookup, ToolError> {
        let node_name = ensure_non_empty(&args.node_name, "node_name")?;
        let query = self.builder.node_by_name(node_name);
        let records = self.execute(&query).await?;
        Ok(shape::node_lookup(node_name, records))
    }

    pub(super) async fn run_get_relationships(
        &self,
        args: GetRelationshipsArgs,
    ) -> Result<Vec<RelationshipView>, ToolError> {
        let node_name = ensure_non_empty(&args.node_name, "node_name")?;
        let query = self.builder.outgoing_relationships(node_name);
        let records = self.execute(&query).await?;
        Ok(shape::relationships(records)?)
    }

    pub(super) async fn run_get_neighbors(
        &self,
        args: GetNeighborsArgs,
    ) -> Result<Vec<NeighborView>, ToolError> {
        let node_name = ensure_non_empty(&args.node_name, "node_name")?;
        let depth = Depth::new(
            args.depth.unwrap_or(i64::from(DEFAULT_DEPTH)),
            self.config.max_depth,
        )?;
        let query = self.builder.neighbor_paths(node_name, depth);
        let records = self.execute(&query).await?;
        Ok(shape::neighbors(node_name, records)?)
    }

    async fn execute(&self, query: &GraphQuery) -> Result<Vec<Record>, ToolError> {
        let records = self.store.execute(query).await.map_err(|err| {
            warn!(kind = query.kind.as_str(), error = %err, "graph query failed");
            ToolError::from(err)
        })?;
        debug!(kind = query.kind.as_str(), rows = records.len(), "graph query returned");
        Ok(records)
    }
}
