//! Directory-backed checkpoint store.
//!
//! One JSON file per key, written through a temp file and rename so a
//! crash mid-write never leaves a half-written checkpoint behind. This is
//! the backend the CLI wires in for all three pipeline stores.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::error::{StoreError, StoreResult};
use crate::traits::store::CheckpointStore;

/// Filesystem implementation of [`CheckpointStore`].
#[derive(Debug)]
pub struct DiskStore {
    dir: PathBuf,
    // Serializes merge read-modify-write cycles within this process.
    merge_lock: Mutex<()>,
}

impl DiskStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            merge_lock: Mutex::new(()),
        })
    }

    /// Directory this store reads and writes.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn check_key(key: &str) -> StoreResult<()> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(())
        } else {
            Err(StoreError::InvalidKey {
                key: key.to_string(),
            })
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    async fn write_atomic(&self, key: &str, value: &Value) -> StoreResult<()> {
        let bytes = serde_json::to_vec(value)?;
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, self.entry_path(key)).await?;
        Ok(())
    }
}

#[async_trait]
impl CheckpointStore for DiskStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Self::check_key(key)?;
        let bytes = match tokio::fs::read(self.entry_path(key)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let value = serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
            key: key.to_string(),
            source,
        })?;
        Ok(Some(value))
    }

    async fn put(&self, key: &str, value: Value) -> StoreResult<()> {
        Self::check_key(key)?;
        self.write_atomic(key, &value).await
    }

    async fn contains(&self, key: &str) -> StoreResult<bool> {
        Self::check_key(key)?;
        match tokio::fs::metadata(self.entry_path(key)).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn keys(&self) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(stem) = name.to_string_lossy().strip_suffix(".json").map(str::to_string)
            else {
                continue;
            };
            if Self::check_key(&stem).is_ok() {
                keys.push(stem);
            }
        }
        keys.sort();
        Ok(keys)
    }

    async fn merge(&self, key: &str, patch: Map<String, Value>) -> StoreResult<()> {
        Self::check_key(key)?;
        // Hold the lock across read and write so interleaved merges to the
        // same key cannot overwrite each other's fields.
        let _guard = self.merge_lock.lock().await;
        let mut current = self
            .get(key)
            .await?
            .unwrap_or_else(|| Value::Object(Map::new()));
        match &mut current {
            Value::Object(object) => {
                for (field, value) in patch {
                    object.insert(field, value);
                }
            }
            _ => {
                return Err(StoreError::NotAnObject {
                    key: key.to_string(),
                })
            }
        }
        self.write_atomic(key, &current).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;
    use tempfile::TempDir;

    async fn open_store(tmp: &TempDir) -> DiskStore {
        DiskStore::open(tmp.path().join("store")).await.unwrap()
    }

    #[tokio::test]
    async fn test_put_get_contains_keys() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        store.put("us", json!({"cpu": []})).await.unwrap();
        store.put("au", json!({})).await.unwrap();

        assert!(store.contains("us").await.unwrap());
        assert!(!store.contains("fr").await.unwrap());
        assert_eq!(store.get("us").await.unwrap(), Some(json!({"cpu": []})));
        assert_eq!(store.get("fr").await.unwrap(), None);
        assert_eq!(store.keys().await.unwrap(), vec!["au", "us"]);
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("store");

        {
            let store = DiskStore::open(&dir).await.unwrap();
            store.put("us", json!({"cpu": 1})).await.unwrap();
        }

        let reopened = DiskStore::open(&dir).await.unwrap();
        assert_eq!(reopened.get("us").await.unwrap(), Some(json!({"cpu": 1})));
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_reported() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;
        tokio::fs::write(store.dir().join("us.json"), b"{not json")
            .await
            .unwrap();

        let result = store.get("us").await;
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn test_invalid_keys_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        for key in ["", "../escape", "a/b", "dot.dot"] {
            let result = store.get(key).await;
            assert!(
                matches!(result, Err(StoreError::InvalidKey { .. })),
                "key {key:?} should be rejected",
            );
        }
    }

    #[tokio::test]
    async fn test_merge_creates_and_extends() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        let mut patch = Map::new();
        patch.insert("cpu".to_string(), json!(1));
        store.merge("us", patch).await.unwrap();

        let mut patch = Map::new();
        patch.insert("memory".to_string(), json!(2));
        store.merge("us", patch).await.unwrap();

        assert_eq!(
            store.get("us").await.unwrap(),
            Some(json!({"cpu": 1, "memory": 2})),
        );
    }

    #[tokio::test]
    async fn test_concurrent_merges_all_land() {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(open_store(&tmp).await);

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let mut patch = Map::new();
                patch.insert(format!("field-{i}"), json!(i));
                store.merge("us", patch).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let merged = store.get("us").await.unwrap().unwrap();
        assert_eq!(merged.as_object().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_merge_into_non_object_fails() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;
        store.put("us", json!("scalar")).await.unwrap();

        let result = store.merge("us", Map::new()).await;
        assert!(matches!(result, Err(StoreError::NotAnObject { .. })));
    }
}
