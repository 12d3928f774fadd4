use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flat property mapping of a graph node.
pub type NodeProperties = Map<String, Value>;

/// Ranked hit returned by a semantic code search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub name: String,
    pub code: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    /// Similarity reported by the backend; higher is more similar.
    pub score: f64,
}

/// One outgoing edge of a node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipView {
    pub relationship_type: String,
    pub target_name: String,
    #[serde(default)]
    pub target_labels: Vec<String>,
}

/// A node reachable from an origin within a bounded number of hops.
///
/// `relationship_types` follows one discovered path from the origin; when
/// several paths reach the same neighbor only one of them is reported.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NeighborView {
    pub name: String,
    #[serde(default)]
    pub labels: Vec<String>,
    pub relationship_types: Vec<String>,
}

/// Outcome of a node lookup by name.
///
/// Absence is a regular outcome rather than an error so callers can branch on
/// it directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NodeLookup {
    Found { properties: NodeProperties },
    NotFound { node_name: String },
}

impl NodeLookup {
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    #[must_use]
    pub const fn properties(&self) -> Option<&NodeProperties> {
        match self {
            Self::Found { properties } => Some(properties),
            Self::NotFound { .. } => None,
        }
    }
}
