//! Document store abstraction and backends.

mod jsonl;
mod memory;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::models::config::StorageConfig;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Field holding the identifier a store assigns to each record.
pub const ID_FIELD: &str = "_id";

/// A collection-oriented store of JSON records.
///
/// Implementations must be shareable across worker threads.
pub trait DocumentStore: Send + Sync {
    /// Open the backing resources.
    fn connect(&self) -> Result<()>;

    /// Release the backing resources.
    fn disconnect(&self) -> Result<()>;

    /// Insert records, returning the assigned identifiers in input order.
    ///
    /// Records must be JSON objects. A record that already carries an `_id`
    /// keeps it.
    fn insert(&self, collection: &str, records: &[Value]) -> Result<Vec<String>>;

    /// Records matching `filter`.
    fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>>;

    /// Set `changes` on every matching record, returning how many were modified.
    fn update(&self, collection: &str, filter: &Filter, changes: &Map<String, Value>) -> Result<usize>;

    /// Remove matching records, returning how many were deleted.
    fn delete(&self, collection: &str, filter: &Filter) -> Result<usize>;

    /// Insert a single record.
    fn insert_one(&self, collection: &str, record: &Value) -> Result<String> {
        let mut ids = self.insert(collection, std::slice::from_ref(record))?;
        ids.pop()
            .ok_or_else(|| StoreError::InvalidRecord("store returned no identifier".to_string()))
    }
}

/// Top-level field equality filter. An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: Map<String, Value>,
}

impl Filter {
    /// Match every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Match records whose `field` equals `value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and(field, value)
    }

    /// Add another equality condition.
    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn matches(&self, record: &Value) -> bool {
        self.fields
            .iter()
            .all(|(field, expected)| record.get(field) == Some(expected))
    }
}

/// Available store backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// Process-local, discarded on exit.
    Memory,
    /// One JSON-lines file per collection.
    Jsonl,
}

impl StoreKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKind::Memory => "memory",
            StoreKind::Jsonl => "jsonl",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mem" => Ok(StoreKind::Memory),
            "jsonl" | "file" => Ok(StoreKind::Jsonl),
            other => Err(format!("unknown store backend: {other}")),
        }
    }
}

/// Construct the store selected by `kind`.
pub fn open_store(kind: StoreKind, config: &StorageConfig) -> Arc<dyn DocumentStore> {
    match kind {
        StoreKind::Memory => Arc::new(MemoryStore::new()),
        StoreKind::Jsonl => Arc::new(JsonlStore::new(&config.data_dir)),
    }
}

/// Copy `record` and make sure it carries an identifier.
fn with_id(record: &Value) -> Result<(String, Value)> {
    let Value::Object(fields) = record else {
        return Err(StoreError::InvalidRecord(format!(
            "expected a JSON object, got {}",
            kind_of(record)
        )));
    };

    let mut fields = fields.clone();
    let id = match fields.get(ID_FIELD) {
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => {
            let id = uuid::Uuid::new_v4().to_string();
            fields.insert(ID_FIELD.to_string(), Value::String(id.clone()));
            id
        }
    };

    Ok((id, Value::Object(fields)))
}

/// Apply `$set`-style changes; returns whether anything changed.
fn apply_changes(record: &mut Value, changes: &Map<String, Value>) -> bool {
    let Value::Object(fields) = record else {
        return false;
    };

    let mut modified = false;
    for (field, value) in changes {
        if fields.get(field) != Some(value) {
            fields.insert(field.clone(), value.clone());
            modified = true;
        }
    }
    modified
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_matching() {
        let record = json!({"discrepancy_type": "Row-Sum", "document_id": "a1"});

        assert!(Filter::all().matches(&record));
        assert!(Filter::eq("discrepancy_type", "Row-Sum").matches(&record));
        assert!(!Filter::eq("discrepancy_type", "Row-Sum").and("document_id", "b2").matches(&record));
        assert!(!Filter::eq("missing", Value::Null).matches(&record));
    }

    #[test]
    fn test_with_id_assigns_and_keeps() {
        let (id, record) = with_id(&json!({"title": "x"})).unwrap();
        assert_eq!(record[ID_FIELD], json!(id));

        let (id, _) = with_id(&json!({"_id": "fixed"})).unwrap();
        assert_eq!(id, "fixed");

        assert!(matches!(with_id(&json!([1, 2])), Err(StoreError::InvalidRecord(_))));
    }

    #[test]
    fn test_store_kind_from_str() {
        assert_eq!("JSONL".parse::<StoreKind>(), Ok(StoreKind::Jsonl));
        assert_eq!("memory".parse::<StoreKind>(), Ok(StoreKind::Memory));
        assert!("mongo".parse::<StoreKind>().is_err());
    }

    #[test]
    fn test_apply_changes() {
        let mut record = json!({"a": 1, "b": 2});
        let changes = json!({"b": 3, "c": 4});

        assert!(apply_changes(&mut record, changes.as_object().unwrap()));
        assert_eq!(record, json!({"a": 1, "b": 3, "c": 4}));
        assert!(!apply_changes(&mut record, changes.as_object().unwrap()));
    }
}
