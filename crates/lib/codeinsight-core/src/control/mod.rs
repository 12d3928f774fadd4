use std::{error::Error, fmt, future::Future, str::FromStr, sync::Arc, time::Duration};

use codeinsight_store::{NeighborView, NodeLookup, RelationshipView, SearchHit};
use serde::Serialize;
use tracing::info;

use crate::embed::{EmbedError, Embedder};
use crate::query::{BoundError, DEFAULT_MAX_DEPTH, DEFAULT_MAX_TOP_K, QueryBuilder};
use crate::store::{GraphStore, StoreError};

pub mod args;
pub mod dispatch;
pub mod tools;

pub use args::{GetNeighborsArgs, GetNodeArgs, GetRelationshipsArgs, SearchCodeArgs, ToolArgs};

#[derive(Debug)]
pub enum ToolError {
    InvalidArgument(String),
    UnknownTool(String),
    EmbeddingFailure(EmbedError),
    Backend(StoreError),
    Timeout(Duration),
}

impl ToolError {
    /// Stable tag for the error category.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::UnknownTool(_) => "unknown_tool",
            Self::EmbeddingFailure(_) => "embedding_failure",
            Self::Backend(_) => "backend_error",
            Self::Timeout(_) => "timeout",
        }
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::UnknownTool(name) => write!(f, "unknown tool: {name}"),
            Self::EmbeddingFailure(err) => write!(f, "{err}"),
            Self::Backend(err) => write!(f, "{err}"),
            Self::Timeout(limit) => write!(f, "tool call timed out after {}ms", limit.as_millis()),
        }
    }
}

impl Error for ToolError {}

impl From<EmbedError> for ToolError {
    fn from(err: EmbedError) -> Self {
        Self::EmbeddingFailure(err)
    }
}

impl From<StoreError> for ToolError {
    fn from(err: StoreError) -> Self {
        Self::Backend(err)
    }
}

impl From<BoundError> for ToolError {
    fn from(err: BoundError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

/// Names of the tools served by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    SearchCode,
    GetNode,
    GetRelationships,
    GetNeighbors,
}

impl ToolName {
    pub const ALL: [Self; 4] = [
        Self::SearchCode,
        Self::GetNode,
        Self::GetRelationships,
        Self::GetNeighbors,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SearchCode => "search_code",
            Self::GetNode => "get_node",
            Self::GetRelationships => "get_relationships",
            Self::GetNeighbors => "get_neighbors",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::SearchCode => {
                "Semantic search over indexed code. Args: question (string), top_k (int, default 5)."
            }
            Self::GetNode => "Fetch all properties of a node by name. Args: node_name (string).",
            Self::GetRelationships => {
                "List outgoing relationships of a node. Args: node_name (string)."
            }
            Self::GetNeighbors => {
                "List nodes connected within depth hops in either direction. Args: node_name (string), depth (int, default 1)."
            }
        }
    }
}

impl FromStr for ToolName {
    type Err = ToolError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.as_str() == name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a dispatched tool call.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ToolOutput {
    SearchHits(Vec<SearchHit>),
    Node(NodeLookup),
    Relationships(Vec<RelationshipView>),
    Neighbors(Vec<NeighborView>),
}

/// Limits applied to every tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    pub max_depth: u32,
    pub max_top_k: u32,
    pub timeout: Option<Duration>,
}

impl DispatcherConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_top_k: DEFAULT_MAX_TOP_K,
            timeout: Some(Duration::from_secs(30)),
        }
    }

    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub const fn with_max_top_k(mut self, max_top_k: u32) -> Self {
        self.max_top_k = max_top_k;
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry point for tool calls.
///
/// Holds the long-lived store and embedder handles; it keeps no other state
/// between calls, so a single instance can serve concurrent requests.
pub struct ToolDispatcher<S: GraphStore, E: Embedder> {
    store: Arc<S>,
    embedder: Arc<E>,
    builder: QueryBuilder,
    config: DispatcherConfig,
}

impl<S: GraphStore, E: Embedder> Clone for ToolDispatcher<S, E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            embedder: self.embedder.clone(),
            builder: self.builder,
            config: self.config,
        }
    }
}

impl<S: GraphStore, E: Embedder> ToolDispatcher<S, E> {
    #[must_use]
    pub fn new(store: S, embedder: E) -> Self {
        Self::from_arcs(Arc::new(store), Arc::new(embedder))
    }

    #[must_use]
    pub fn from_arcs(store: Arc<S>, embedder: Arc<E>) -> Self {
        Self {
            store,
            embedder,
            builder: QueryBuilder::new(),
            config: DispatcherConfig::default(),
        }
    }

    #[must_use]
    pub const fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Releases the store and embedder handles held by this dispatcher.
    ///
    /// Handles shared with other clones stay alive until those are dropped.
    pub fn shutdown(self) {
        let store_refs = Arc::strong_count(&self.store);
        let embedder_refs = Arc::strong_count(&self.embedder);
        drop(self);
        info!(
            store_refs = store_refs - 1,
            embedder_refs = embedder_refs - 1,
            "tool dispatcher shut down"
        );
    }

    async fn bounded<T, F>(&self, deadline: Option<Duration>, operation: F) -> Result<T, ToolError>
    where
        F: Future<Output = Result<T, ToolError>>,
    {
        match deadline.or(self.config.timeout) {
            Some(limit) => tokio::time::timeout(limit, operation)
                .await
                .map_err(|_| ToolError::Timeout(limit))?,
            None => operation.await,
        }
    }
}
