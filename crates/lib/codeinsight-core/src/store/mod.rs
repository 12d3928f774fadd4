//! Graph store interface and `SurrealDB` implementation.
//!
//! The query layer only relies on executing a parameterized query and reading
//! named fields from the returned rows.

pub mod surreal;

use std::{error::Error, fmt, future::Future};

use serde_json::{Map, Value};

pub use surreal::SurrealGraphStore;

#[derive(Debug)]
pub enum StoreError {
    Surreal(Box<surrealdb::Error>),
    Unavailable(String),
    Conversion(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Surreal(err) => write!(f, "SurrealDB error: {err}"),
            Self::Unavailable(message) => write!(f, "Graph store unavailable: {message}"),
            Self::Conversion(message) => write!(f, "Unexpected row shape: {message}"),
        }
    }
}

impl Error for StoreError {}

impl From<surrealdb::Error> for StoreError {
    fn from(err: surrealdb::Error) -> Self {
        Self::Surreal(Box::new(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The operation a query was built for.
///
/// Adapters execute `GraphQuery::text`; the kind travels alongside it for
/// logging and for stores that answer queries natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    SemanticSearch,
    NodeByName,
    OutgoingRelationships,
    NeighborPaths { depth: u32 },
}

impl QueryKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SemanticSearch => "semantic_search",
            Self::NodeByName => "node_by_name",
            Self::OutgoingRelationships => "outgoing_relationships",
            Self::NeighborPaths { .. } => "neighbor_paths",
        }
    }
}

/// A parameterized backend query.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphQuery {
    pub kind: QueryKind,
    pub text: String,
    pub params: Map<String, Value>,
    /// Index of the statement whose rows form the result.
    pub result_index: usize,
}

impl GraphQuery {
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    #[must_use]
    pub fn str_param(&self, name: &str) -> Option<&str> {
        self.param(name).and_then(Value::as_str)
    }
}

/// A single result row with named field access.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record(Map<String, Value>);

impl Record {
    #[must_use]
    pub const fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|value| !value.is_null())
    }

    #[must_use]
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    #[must_use]
    pub fn f64_field(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(Value::as_f64)
    }

    /// Reads a list of strings; absent fields read as an empty list.
    ///
    /// # Errors
    /// Returns `StoreError::Conversion` if the field holds anything other than
    /// an array of strings.
    pub fn string_list(&self, field: &str) -> StoreResult<Vec<String>> {
        let Some(value) = self.get(field) else {
            return Ok(Vec::new());
        };
        let Some(items) = value.as_array() else {
            return Err(StoreError::Conversion(format!(
                "field {field} is not a list"
            )));
        };
        items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    StoreError::Conversion(format!("field {field} holds a non-string item"))
                })
            })
            .collect()
    }

    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// Read-only access to the code graph.
///
/// Implementations must be safe to share across concurrent callers; each
/// execution owns its own response state.
pub trait GraphStore: Send + Sync + 'static {
    /// Executes a query and returns the rows of its result statement.
    fn execute(&self, query: &GraphQuery) -> impl Future<Output = StoreResult<Vec<Record>>> + Send;
}
