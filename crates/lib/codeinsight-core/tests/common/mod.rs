#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use codeinsight_core::embed::{EmbedError, Embedder};
use codeinsight_core::query::PARAM_NODE_NAME;
use codeinsight_core::store::{GraphQuery, GraphStore, QueryKind, Record, StoreError, StoreResult};
use codeinsight_store::schema::{LABEL_CLASS, LABEL_TYPE, REL_CALLS, REL_INHERITS};
use serde_json::{Map, Value, json};

pub const DIMENSIONS: usize = 3;

struct MemoryNode {
    id: String,
    name: String,
    labels: Vec<String>,
    properties: Map<String, Value>,
    embedding: Option<Vec<f32>>,
}

struct MemoryEdge {
    src: usize,
    dst: usize,
    kind: String,
}

#[derive(Clone)]
struct PathState {
    node: usize,
    kinds: Vec<String>,
    visited: Vec<usize>,
}

/// In-memory graph that answers each query kind the way the `SurrealDB`
/// queries do: same row fields, same row order.
#[derive(Default)]
pub struct MemoryGraph {
    nodes: Vec<MemoryNode>,
    edges: Vec<MemoryEdge>,
    failure: Option<String>,
    calls: AtomicUsize,
    last_query: Mutex<Option<GraphQuery>>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn with_node(mut self, name: &str, labels: &[&str]) -> Self {
        let id = format!("node:{}", self.nodes.len());
        let mut properties = Map::new();
        properties.insert("name".to_string(), json!(name));
        properties.insert("labels".to_string(), json!(labels));
        self.nodes.push(MemoryNode {
            id,
            name: name.to_string(),
            labels: labels.iter().map(|label| (*label).to_string()).collect(),
            properties,
            embedding: None,
        });
        self
    }

    pub fn with_property(mut self, name: &str, key: &str, value: Value) -> Self {
        let index = self.index_of(name);
        self.nodes[index].properties.insert(key.to_string(), value);
        self
    }

    pub fn with_code(self, name: &str, code: &str, file_path: &str) -> Self {
        self.with_property(name, "code", json!(code))
            .with_property(name, "filePath", json!(file_path))
    }

    pub fn with_embedding(mut self, name: &str, embedding: [f32; DIMENSIONS]) -> Self {
        let index = self.index_of(name);
        self.nodes[index].embedding = Some(embedding.to_vec());
        self.nodes[index]
            .properties
            .insert("embedding".to_string(), json!(embedding));
        self
    }

    pub fn with_edge(mut self, src: &str, kind: &str, dst: &str) -> Self {
        let src = self.index_of(src);
        let dst = self.index_of(dst);
        self.edges.push(MemoryEdge {
            src,
            dst,
            kind: kind.to_string(),
        });
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<GraphQuery> {
        self.last_query
            .lock()
            .expect("last query lock poisoned")
            .clone()
    }

    fn index_of(&self, name: &str) -> usize {
        self.nodes
            .iter()
            .position(|node| node.name == name)
            .unwrap_or_else(|| panic!("unknown node {name}"))
    }

    fn find(&self, query: &GraphQuery) -> Option<usize> {
        let name = query.str_param(PARAM_NODE_NAME)?;
        self.nodes.iter().position(|node| node.name == name)
    }

    fn semantic_search(&self, query: &GraphQuery) -> Vec<Record> {
        let embedding: Vec<f32> = query
            .param("embedding")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_f64)
                    .map(|value| value as f32)
                    .collect()
            })
            .unwrap_or_default();
        let top_k = query
            .param("top_k")
            .and_then(Value::as_u64)
            .and_then(|value| usize::try_from(value).ok())
            .unwrap_or(0);

        let mut scored: Vec<(f64, &MemoryNode)> = self
            .nodes
            .iter()
            .filter_map(|node| {
                node.embedding
                    .as_ref()
                    .map(|stored| (cosine(stored, &embedding), node))
            })
            .collect();
        scored.sort_by(|left, right| right.0.total_cmp(&left.0));
        scored
            .into_iter()
            .take(top_k)
            .map(|(score, node)| {
                record(json!({
                    "name": node.name,
                    "code": node.properties.get("code"),
                    "filePath": node.properties.get("filePath"),
                    "score": score,
                }))
            })
            .collect()
    }

    fn node_by_name(&self, query: &GraphQuery) -> Vec<Record> {
        self.find(query)
            .map(|index| {
                let mut properties = self.nodes[index].properties.clone();
                properties.remove("embedding");
                vec![Record::new(properties)]
            })
            .unwrap_or_default()
    }

    fn outgoing_relationships(&self, query: &GraphQuery) -> Vec<Record> {
        let Some(name) = query.str_param(PARAM_NODE_NAME) else {
            return Vec::new();
        };
        self.edges
            .iter()
            .filter(|edge| self.nodes[edge.src].name == name)
            .map(|edge| {
                let target = &self.nodes[edge.dst];
                record(json!({
                    "relationshipType": edge.kind,
                    "targetName": target.name,
                    "targetLabels": target.labels,
                }))
            })
            .collect()
    }

    fn neighbor_paths(&self, query: &GraphQuery, depth: u32) -> Vec<Record> {
        let Some(origin) = self.find(query) else {
            return Vec::new();
        };
        let mut frontier = vec![PathState {
            node: origin,
            kinds: Vec::new(),
            visited: vec![origin],
        }];
        let mut paths = Vec::new();
        for _ in 0..depth {
            let mut next = Vec::new();
            for path in &frontier {
                for edge in &self.edges {
                    if edge.src == path.node && !path.visited.contains(&edge.dst) {
                        next.push(extend(path, edge.dst, &edge.kind));
                    }
                }
                for edge in &self.edges {
                    if edge.dst == path.node && !path.visited.contains(&edge.src) {
                        next.push(extend(path, edge.src, &edge.kind));
                    }
                }
            }
            paths.extend(next.iter().cloned());
            frontier = next;
        }
        paths
            .into_iter()
            .map(|path| {
                let node = &self.nodes[path.node];
                record(json!({
                    "identity": node.id,
                    "name": node.name,
                    "labels": node.labels,
                    "relationshipTypes": path.kinds,
                }))
            })
            .collect()
    }
}

impl GraphStore for MemoryGraph {
    async fn execute(&self, query: &GraphQuery) -> StoreResult<Vec<Record>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().expect("last query lock poisoned") = Some(query.clone());
        if let Some(message) = &self.failure {
            return Err(StoreError::Unavailable(message.clone()));
        }
        Ok(match query.kind {
            QueryKind::SemanticSearch => self.semantic_search(query),
            QueryKind::NodeByName => self.node_by_name(query),
            QueryKind::OutgoingRelationships => self.outgoing_relationships(query),
            QueryKind::NeighborPaths { depth } => self.neighbor_paths(query, depth),
        })
    }
}

fn extend(path: &PathState, node: usize, kind: &str) -> PathState {
    let mut next = path.clone();
    next.node = node;
    next.kinds.push(kind.to_string());
    next.visited.push(node);
    next
}

fn cosine(left: &[f32], right: &[f32]) -> f64 {
    let dot: f64 = left
        .iter()
        .zip(right)
        .map(|(a, b)| f64::from(*a) * f64::from(*b))
        .sum();
    let norm = |values: &[f32]| {
        values
            .iter()
            .map(|value| f64::from(*value).powi(2))
            .sum::<f64>()
            .sqrt()
    };
    let denominator = norm(left) * norm(right);
    if denominator == 0.0 { 0.0 } else { dot / denominator }
}

fn record(value: Value) -> Record {
    match value {
        Value::Object(fields) => Record::new(fields),
        other => panic!("expected an object row, got {other}"),
    }
}

/// Store whose queries never finish in time.
pub struct StalledStore;

impl GraphStore for StalledStore {
    async fn execute(&self, _query: &GraphQuery) -> StoreResult<Vec<Record>> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Vec::new())
    }
}

/// Embedder returning fixed vectors per text and counting its calls.
#[derive(Default)]
pub struct FakeEmbedder {
    vectors: HashMap<String, [f32; DIMENSIONS]>,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_vector(mut self, text: &str, vector: [f32; DIMENSIONS]) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Embedder for FakeEmbedder {
    fn dimensions(&self) -> usize {
        DIMENSIONS
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EmbedError::Request("connection refused".to_string()));
        }
        Ok(self
            .vectors
            .get(text)
            .copied()
            .unwrap_or([1.0, 0.0, 0.0])
            .to_vec())
    }
}

/// Foo --CALLS--> Bar --INHERITS--> Baz
pub fn chain_graph() -> MemoryGraph {
    MemoryGraph::new()
        .with_node("Foo", &[LABEL_CLASS])
        .with_node("Bar", &[LABEL_CLASS])
        .with_node("Baz", &[LABEL_TYPE])
        .with_edge("Foo", REL_CALLS, "Bar")
        .with_edge("Bar", REL_INHERITS, "Baz")
}
