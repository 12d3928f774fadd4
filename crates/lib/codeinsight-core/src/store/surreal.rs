use std::sync::Arc;

use serde_json::Value;
use surrealdb::{Connection, Surreal};
use tracing::{debug, warn};

use super::{GraphQuery, GraphStore, Record, StoreError, StoreResult};

/// Graph store backed by a shared `SurrealDB` connection.
pub struct SurrealGraphStore<C: Connection> {
    db: Arc<Surreal<C>>,
}

impl<C: Connection> Clone for SurrealGraphStore<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealGraphStore<C> {
    #[must_use]
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            db: Arc::new(db),
        }
    }

    #[must_use]
    pub const fn from_arc(db: Arc<Surreal<C>>) -> Self {
        Self { db }
    }

    #[must_use]
    pub fn db(&self) -> &Surreal<C> {
        &self.db
    }
}

impl<C: Connection> GraphStore for SurrealGraphStore<C> {
    async fn execute(&self, query: &GraphQuery) -> StoreResult<Vec<Record>> {
        debug!(kind = query.kind.as_str(), "executing graph query");
        let mut request = self.db.query(query.text.as_str());
        for (name, value) in &query.params {
            request = request.bind((name.clone(), value.clone()));
        }
        let mut response = match request.await {
            Ok(response) => response,
            Err(err) => return Err(self.classify(err).await),
        };

        let raw: surrealdb::Value = response.take(query.result_index)?;
        rows_from_json(raw.into_inner().into_json())
    }
}

impl<C: Connection> SurrealGraphStore<C> {
    /// A failed query against an unreachable server is `Unavailable`;
    /// anything else is reported as the query error.
    async fn classify(&self, err: surrealdb::Error) -> StoreError {
        match self.db.health().await {
            Ok(()) => StoreError::from(err),
            Err(health) => {
                warn!(error = %health, "graph store health check failed");
                StoreError::Unavailable(err.to_string())
            }
        }
    }
}

fn rows_from_json(value: Value) -> StoreResult<Vec<Record>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Object(fields) => Ok(vec![Record::new(fields)]),
        Value::Array(items) => items
            .into_iter()
            .filter(|item| !item.is_null())
            .map(|item| match item {
                Value::Object(fields) => Ok(Record::new(fields)),
                other => Err(StoreError::Conversion(format!(
                    "expected an object row, got {other}"
                ))),
            })
            .collect(),
        other => Err(StoreError::Conversion(format!(
            "expected a list of rows, got {other}"
        ))),
    }
}
