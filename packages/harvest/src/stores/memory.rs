//! In-memory checkpoint store for tests and dry runs.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};
use crate::traits::store::CheckpointStore;

/// In-memory implementation of [`CheckpointStore`].
///
/// Backed by a `RwLock<BTreeMap>`; nothing survives the process. Merges
/// hold the write lock for the whole read-modify-write, which is what
/// makes them atomic here.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn entry_count(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Remove every key.
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }
}

#[async_trait]
impl CheckpointStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    async fn put(&self, key: &str, value: Value) -> StoreResult<()> {
        self.entries.write().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn contains(&self, key: &str) -> StoreResult<bool> {
        Ok(self.entries.read().unwrap().contains_key(key))
    }

    async fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.entries.read().unwrap().keys().cloned().collect())
    }

    async fn merge(&self, key: &str, patch: Map<String, Value>) -> StoreResult<()> {
        let mut entries = self.entries.write().unwrap();
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        match entry {
            Value::Object(object) => {
                for (field, value) in patch {
                    object.insert(field, value);
                }
                Ok(())
            }
            _ => Err(StoreError::NotAnObject {
                key: key.to_string(),
            }),
        }
    }
}
