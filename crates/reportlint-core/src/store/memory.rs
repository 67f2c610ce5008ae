//! In-memory document store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use serde_json::{Map, Value};

use super::{DocumentStore, Filter, Result, apply_changes, with_id};
use crate::error::StoreError;

/// Keeps collections in process memory.
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
        }
    }

    /// Number of records in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.lock()
            .map(|guard| guard.get(collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<Value>>>> {
        self.collections.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MemoryStore {
    fn connect(&self) -> Result<()> {
        Ok(())
    }

    fn disconnect(&self) -> Result<()> {
        Ok(())
    }

    fn insert(&self, collection: &str, records: &[Value]) -> Result<Vec<String>> {
        let prepared = records.iter().map(with_id).collect::<Result<Vec<_>>>()?;

        let mut guard = self.lock()?;
        let stored = guard.entry(collection.to_string()).or_default();

        let mut ids = Vec::with_capacity(prepared.len());
        for (id, record) in prepared {
            stored.push(record);
            ids.push(id);
        }
        Ok(ids)
    }

    fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>> {
        let guard = self.lock()?;
        Ok(guard
            .get(collection)
            .map(|records| records.iter().filter(|r| filter.matches(r)).cloned().collect())
            .unwrap_or_default())
    }

    fn update(&self, collection: &str, filter: &Filter, changes: &Map<String, Value>) -> Result<usize> {
        let mut guard = self.lock()?;
        let Some(records) = guard.get_mut(collection) else {
            return Ok(0);
        };

        Ok(records
            .iter_mut()
            .filter(|r| filter.matches(r))
            .map(|r| apply_changes(r, changes))
            .filter(|modified| *modified)
            .count())
    }

    fn delete(&self, collection: &str, filter: &Filter) -> Result<usize> {
        let mut guard = self.lock()?;
        let Some(records) = guard.get_mut(collection) else {
            return Ok(0);
        };

        let before = records.len();
        records.retain(|r| !filter.matches(r));
        Ok(before - records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_insert_and_find() {
        let store = MemoryStore::new();
        let ids = store
            .insert("documents", &[json!({"title": "a"}), json!({"title": "b"})])
            .unwrap();

        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);

        let found = store.find("documents", &Filter::eq("_id", ids[1].clone())).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["title"], json!("b"));
    }

    #[test]
    fn test_insert_rejects_non_objects_atomically() {
        let store = MemoryStore::new();
        let result = store.insert("documents", &[json!({"title": "a"}), json!("oops")]);

        assert!(result.is_err());
        assert_eq!(store.len("documents"), 0);
    }

    #[test]
    fn test_update_and_delete() {
        let store = MemoryStore::new();
        store
            .insert("d", &[json!({"k": 1, "v": "x"}), json!({"k": 2, "v": "x"}), json!({"k": 3, "v": "y"})])
            .unwrap();

        let changes = json!({"v": "z"});
        let modified = store.update("d", &Filter::eq("v", "x"), changes.as_object().unwrap()).unwrap();
        assert_eq!(modified, 2);

        let deleted = store.delete("d", &Filter::eq("v", "z")).unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(store.len("d"), 1);
    }

    #[test]
    fn test_unknown_collection() {
        let store = MemoryStore::new();
        assert!(store.find("nothing", &Filter::all()).unwrap().is_empty());
        assert_eq!(store.delete("nothing", &Filter::all()).unwrap(), 0);
    }
}
