//! Checkpoint store abstraction.
//!
//! Every stage boundary persists through this trait, so resumability does
//! not depend on which backend a caller wires in. Implementations must be
//! idempotent per key: writing the same value twice leaves the same state.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StoreResult;

/// Keyed JSON checkpoint storage.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Fetch the value stored under `key`, or `None` if the key is absent.
    async fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: Value) -> StoreResult<()>;

    /// Whether `key` currently holds a value.
    async fn contains(&self, key: &str) -> StoreResult<bool>;

    /// All keys currently present, sorted.
    async fn keys(&self) -> StoreResult<Vec<String>>;

    /// Merge `patch` into the JSON object stored under `key`.
    ///
    /// An absent key is treated as an empty object. The read-modify-write
    /// is serialized per store, so concurrent merges to the same key all
    /// land; none is lost to an interleaved writer. Fails with
    /// [`StoreError::NotAnObject`](crate::error::StoreError::NotAnObject)
    /// when the stored value is not a JSON object.
    async fn merge(&self, key: &str, patch: Map<String, Value>) -> StoreResult<()>;
}
