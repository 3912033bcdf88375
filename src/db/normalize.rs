//! Result shape normalization.
//!
//! Executors may hand back a bare row sequence or a wrapper object carrying an
//! optional `rows` field. Callers only ever see `Vec<Row>`.

use crate::models::Row;
use serde_json::Value as JsonValue;
use tracing::warn;

/// Rows as returned by an executor, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RowSet {
    /// A bare row sequence.
    Rows(Vec<Row>),
    /// A driver result object whose `rows` field may be missing.
    Wrapped { rows: Option<Vec<Row>> },
}

impl RowSet {
    pub fn empty() -> Self {
        Self::Rows(Vec::new())
    }
}

impl From<Vec<Row>> for RowSet {
    fn from(rows: Vec<Row>) -> Self {
        Self::Rows(rows)
    }
}

/// Read a driver result given as raw JSON: an array of objects, or an object
/// with a `rows` array. Non-object entries are skipped.
impl From<JsonValue> for RowSet {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Array(items) => Self::Rows(object_rows(items)),
            JsonValue::Object(mut map) => match map.remove("rows") {
                Some(JsonValue::Array(items)) => Self::Wrapped {
                    rows: Some(object_rows(items)),
                },
                _ => Self::Wrapped { rows: None },
            },
            JsonValue::Null => Self::Wrapped { rows: None },
            other => {
                warn!(value = %other, "Unexpected result shape, treating as empty");
                Self::Wrapped { rows: None }
            }
        }
    }
}

fn object_rows(items: Vec<JsonValue>) -> Vec<Row> {
    items
        .into_iter()
        .filter_map(|item| match item {
            JsonValue::Object(row) => Some(row),
            other => {
                warn!(value = %other, "Skipping non-object row");
                None
            }
        })
        .collect()
}

/// Produce the canonical row sequence; never absent.
pub fn normalize(set: RowSet) -> Vec<Row> {
    match set {
        RowSet::Rows(rows) => rows,
        RowSet::Wrapped { rows } => rows.unwrap_or_default(),
    }
}
