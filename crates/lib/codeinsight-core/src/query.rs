//! SurrealQL construction for the tool operations.
//!
//! Every caller-supplied value is passed as a bound parameter. The traversal
//! depth never appears in the query text as a value: it only decides how many
//! fixed expansion stages are emitted, and it can only be obtained through the
//! bounded [`Depth`] constructor.

use std::{error::Error, fmt, fmt::Write as _};

use codeinsight_store::schema::{
    FIELD_CODE,
    FIELD_EMBEDDING,
    FIELD_FILE_PATH,
    FIELD_LABELS,
    FIELD_NAME,
    TABLE_EDGE,
    TABLE_NODE,
};
use serde_json::{Map, Value};

use crate::store::{GraphQuery, QueryKind};

pub const PARAM_NODE_NAME: &str = "node_name";
pub const PARAM_EMBEDDING: &str = "embedding";
pub const PARAM_TOP_K: &str = "top_k";

/// Row field carrying a stable identity for neighbor deduplication.
pub const FIELD_IDENTITY: &str = "identity";
pub const FIELD_SCORE: &str = "score";
pub const FIELD_RELATIONSHIP_TYPE: &str = "relationshipType";
pub const FIELD_TARGET_NAME: &str = "targetName";
pub const FIELD_TARGET_LABELS: &str = "targetLabels";
pub const FIELD_RELATIONSHIP_TYPES: &str = "relationshipTypes";

pub const DEFAULT_TOP_K: u32 = 5;
pub const DEFAULT_DEPTH: u32 = 1;
pub const DEFAULT_MAX_TOP_K: u32 = 100;
pub const DEFAULT_MAX_DEPTH: u32 = 5;

/// A positive integer argument that exceeded its range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundError {
    pub name: &'static str,
    pub value: i64,
    pub max: u32,
}

impl fmt::Display for BoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} must be an integer between 1 and {}, got {}",
            self.name, self.max, self.value
        )
    }
}

impl Error for BoundError {}

fn bounded(name: &'static str, value: i64, max: u32) -> Result<u32, BoundError> {
    match u32::try_from(value) {
        Ok(valid) if (1..=max).contains(&valid) => Ok(valid),
        _ => Err(BoundError { name, value, max }),
    }
}

/// Maximum number of hops in a neighbor traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Depth(u32);

impl Depth {
    /// Validates a requested depth against the configured maximum.
    ///
    /// # Errors
    /// Returns `BoundError` when `value` is not within `1..=max`.
    pub fn new(value: i64, max: u32) -> Result<Self, BoundError> {
        bounded("depth", value, max).map(Self)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Number of nearest neighbors requested from the vector search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopK(u32);

impl TopK {
    /// Validates a requested result count against the configured maximum.
    ///
    /// # Errors
    /// Returns `BoundError` when `value` is not within `1..=max`.
    pub fn new(value: i64, max: u32) -> Result<Self, BoundError> {
        bounded("top_k", value, max).map(Self)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Builds the backend queries for the four tool operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBuilder;

impl QueryBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Nearest nodes by cosine similarity, most similar first.
    #[must_use]
    pub fn semantic_search(&self, embedding: &[f32], top_k: TopK) -> GraphQuery {
        let text = format!(
            "SELECT {FIELD_NAME}, {FIELD_CODE}, {FIELD_FILE_PATH}, \
             vector::similarity::cosine({FIELD_EMBEDDING}, ${PARAM_EMBEDDING}) AS {FIELD_SCORE} \
             FROM {TABLE_NODE} WHERE {FIELD_EMBEDDING} != NONE \
             ORDER BY {FIELD_SCORE} DESC LIMIT ${PARAM_TOP_K};"
        );
        let mut params = Map::new();
        params.insert(
            PARAM_EMBEDDING.to_string(),
            Value::Array(embedding.iter().map(|v| Value::from(f64::from(*v))).collect()),
        );
        params.insert(PARAM_TOP_K.to_string(), Value::from(top_k.get()));
        GraphQuery {
            kind: QueryKind::SemanticSearch,
            text,
            params,
            result_index: 0,
        }
    }

    /// First node whose name matches, without its record id or embedding.
    #[must_use]
    pub fn node_by_name(&self, node_name: &str) -> GraphQuery {
        let text = format!(
            "SELECT * OMIT id, {FIELD_EMBEDDING} FROM {TABLE_NODE} \
             WHERE {FIELD_NAME} = ${PARAM_NODE_NAME} LIMIT 1;"
        );
        GraphQuery {
            kind: QueryKind::NodeByName,
            text,
            params: name_params(node_name),
            result_index: 0,
        }
    }

    /// Outgoing edges of the named node with their targets.
    #[must_use]
    pub fn outgoing_relationships(&self, node_name: &str) -> GraphQuery {
        let text = format!(
            "SELECT kind AS {FIELD_RELATIONSHIP_TYPE}, dst.{FIELD_NAME} AS {FIELD_TARGET_NAME}, \
             dst.{FIELD_LABELS} AS {FIELD_TARGET_LABELS} \
             FROM {TABLE_EDGE} WHERE src.{FIELD_NAME} = ${PARAM_NODE_NAME};"
        );
        GraphQuery {
            kind: QueryKind::OutgoingRelationships,
            text,
            params: name_params(node_name),
            result_index: 0,
        }
    }

    /// Every simple undirected path of length `1..=depth` from the named node.
    ///
    /// The query is a fixed pipeline: one statement resolves the origin, one
    /// statement per hop extends the paths of the previous hop without
    /// revisiting a node, and the last statement projects every path. Rows come
    /// back ordered by hop count, so the first row for a neighbor carries one of
    /// its shortest paths.
    #[must_use]
    pub fn neighbor_paths(&self, node_name: &str, depth: Depth) -> GraphQuery {
        let hops = depth.get();
        let mut text = String::new();
        let _ = writeln!(
            text,
            "LET $origin = (SELECT VALUE id FROM {TABLE_NODE} WHERE {FIELD_NAME} = ${PARAM_NODE_NAME} LIMIT 1);"
        );
        let _ = writeln!(
            text,
            "LET $hop1 = array::concat(\
             (SELECT dst AS node, [kind] AS kinds, [src, dst] AS visited FROM {TABLE_EDGE} WHERE src INSIDE $origin), \
             (SELECT src AS node, [kind] AS kinds, [dst, src] AS visited FROM {TABLE_EDGE} WHERE dst INSIDE $origin));"
        );
        for hop in 2..=hops {
            let previous = hop - 1;
            let _ = writeln!(
                text,
                "LET $hop{hop} = array::flatten((SELECT VALUE array::concat(\
                 (SELECT VALUE {{ node: dst, kinds: array::append($parent.kinds, kind), visited: array::append($parent.visited, dst) }} \
                 FROM {TABLE_EDGE} WHERE src = $parent.node AND dst NOTINSIDE $parent.visited), \
                 (SELECT VALUE {{ node: src, kinds: array::append($parent.kinds, kind), visited: array::append($parent.visited, src) }} \
                 FROM {TABLE_EDGE} WHERE dst = $parent.node AND src NOTINSIDE $parent.visited)\
                 ) FROM $hop{previous}));"
            );
        }
        let stages = (1..=hops)
            .map(|hop| format!("$hop{hop}"))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(text, "LET $paths = array::concat({stages});");
        let _ = write!(
            text,
            "SELECT <string> node AS {FIELD_IDENTITY}, node.{FIELD_NAME} AS {FIELD_NAME}, \
             node.{FIELD_LABELS} AS {FIELD_LABELS}, kinds AS {FIELD_RELATIONSHIP_TYPES} FROM $paths;"
        );

        GraphQuery {
            kind: QueryKind::NeighborPaths { depth: hops },
            text,
            params: name_params(node_name),
            // origin + one statement per hop + paths, then the projection.
            result_index: hops as usize + 2,
        }
    }
}

fn name_params(node_name: &str) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert(
        PARAM_NODE_NAME.to_string(),
        Value::String(node_name.to_string()),
    );
    params
}
