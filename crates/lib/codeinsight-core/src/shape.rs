//! Conversion of raw store rows into tool responses.

use std::collections::HashSet;

use codeinsight_store::schema::{FIELD_CODE, FIELD_EMBEDDING, FIELD_FILE_PATH, FIELD_LABELS, FIELD_NAME};
use codeinsight_store::{NeighborView, NodeLookup, RelationshipView, SearchHit};

use crate::query::{
    FIELD_IDENTITY,
    FIELD_RELATIONSHIP_TYPE,
    FIELD_RELATIONSHIP_TYPES,
    FIELD_SCORE,
    FIELD_TARGET_LABELS,
    FIELD_TARGET_NAME,
};
use crate::store::{Record, StoreError, StoreResult};

/// Search hits in the order the backend ranked them.
///
/// # Errors
/// Returns `StoreError::Conversion` if a row lacks a name or a numeric score.
pub fn search_hits(records: Vec<Record>) -> StoreResult<Vec<SearchHit>> {
    records
        .iter()
        .map(|record| {
            Ok(SearchHit {
                name: required_str(record, FIELD_NAME)?,
                code: record.str_field(FIELD_CODE).map(str::to_string),
                file_path: record.str_field(FIELD_FILE_PATH).map(str::to_string),
                score: record.f64_field(FIELD_SCORE).ok_or_else(|| {
                    StoreError::Conversion(format!("missing numeric {FIELD_SCORE}"))
                })?,
            })
        })
        .collect()
}

/// The first row as a property map, or `NotFound` when there is none.
#[must_use]
pub fn node_lookup(node_name: &str, records: Vec<Record>) -> NodeLookup {
    let Some(record) = records.into_iter().next() else {
        return NodeLookup::NotFound {
            node_name: node_name.to_string(),
        };
    };
    let mut properties = record.into_fields();
    properties.remove("id");
    properties.remove(FIELD_EMBEDDING);
    NodeLookup::Found { properties }
}

/// One view per edge row; parallel edges stay distinct.
///
/// # Errors
/// Returns `StoreError::Conversion` if a row lacks its type or target name.
pub fn relationships(records: Vec<Record>) -> StoreResult<Vec<RelationshipView>> {
    records
        .iter()
        .map(|record| {
            Ok(RelationshipView {
                relationship_type: required_str(record, FIELD_RELATIONSHIP_TYPE)?,
                target_name: required_str(record, FIELD_TARGET_NAME)?,
                target_labels: record.string_list(FIELD_TARGET_LABELS)?,
            })
        })
        .collect()
}

/// Collapses path rows into one view per neighbor.
///
/// The first row seen for a neighbor wins. Rows that lead back to the origin
/// are dropped.
///
/// # Errors
/// Returns `StoreError::Conversion` if a row lacks a name or holds malformed
/// label or relationship lists.
pub fn neighbors(origin: &str, records: Vec<Record>) -> StoreResult<Vec<NeighborView>> {
    let mut seen = HashSet::new();
    let mut views = Vec::new();
    for record in &records {
        let name = required_str(record, FIELD_NAME)?;
        if name == origin {
            continue;
        }
        let identity = record
            .str_field(FIELD_IDENTITY)
            .map_or_else(|| name.clone(), str::to_string);
        if !seen.insert(identity) {
            continue;
        }
        views.push(NeighborView {
            name,
            labels: record.string_list(FIELD_LABELS)?,
            relationship_types: record.string_list(FIELD_RELATIONSHIP_TYPES)?,
        });
    }
    Ok(views)
}

fn required_str(record: &Record, field: &str) -> StoreResult<String> {
    record
        .str_field(field)
        .map(str::to_string)
        .ok_or_else(|| StoreError::Conversion(format!("missing string field {field}")))
}
