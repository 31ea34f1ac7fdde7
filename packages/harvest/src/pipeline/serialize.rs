//! Stage four, first half: reduce parsed records to plain data.

use std::collections::BTreeMap;

use tracing::info;

use crate::error::{HarvestError, Result, StoreError};
use crate::traits::store::CheckpointStore;
use crate::types::snapshot::{ParsedSnapshot, PlainSnapshot, SNAPSHOT_KEY};

/// Outcome of a serialize run.
#[derive(Debug)]
pub struct SerializeReport {
    /// Regions carried over from the parsed snapshot.
    pub regions: usize,

    /// Records reduced to plain data.
    pub records: usize,
}

/// Reduce the parsed snapshot to its schema-erased form and checkpoint it.
///
/// Requires a parsed snapshot under [`SNAPSHOT_KEY`]; fails with
/// [`HarvestError::SnapshotMissing`] when the parse stage has not run.
pub async fn run_serialize<S, T>(parsed_store: &S, json_store: &T) -> Result<SerializeReport>
where
    S: CheckpointStore,
    T: CheckpointStore,
{
    let value = parsed_store
        .get(SNAPSHOT_KEY)
        .await?
        .ok_or(HarvestError::SnapshotMissing { store: "parsed" })?;
    let snapshot: ParsedSnapshot =
        serde_json::from_value(value).map_err(|source| StoreError::Corrupt {
            key: SNAPSHOT_KEY.to_string(),
            source,
        })?;

    let mut plain = PlainSnapshot::new();
    let mut records = 0;
    for (region, by_category) in &snapshot {
        let mut region_plain = BTreeMap::new();
        for (category, parsed) in by_category {
            let mut entries = Vec::with_capacity(parsed.len());
            for record in parsed {
                entries.push(record.to_plain()?);
            }
            records += entries.len();
            region_plain.insert(*category, entries);
        }
        plain.insert(*region, region_plain);
    }

    let regions = plain.len();
    json_store
        .put(SNAPSHOT_KEY, serde_json::to_value(&plain)?)
        .await?;

    info!(regions, records, "serialize stage finished");
    Ok(SerializeReport { regions, records })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    use crate::stores::memory::MemoryStore;
    use crate::testing::sample_record;
    use crate::types::catalog::{Category, Region};

    #[tokio::test]
    async fn test_serialize_erases_schema_tags() {
        let parsed = MemoryStore::new();
        let json = MemoryStore::new();

        let mut snapshot = ParsedSnapshot::new();
        let mut by_category = BTreeMap::new();
        by_category.insert(
            Category::Cpu,
            vec![
                sample_record(Category::Cpu, "Ryzen 5 5600", "AMD"),
                sample_record(Category::Cpu, "Core i5-12400F", "Intel"),
            ],
        );
        snapshot.insert(Region::Us, by_category);
        parsed
            .put(SNAPSHOT_KEY, serde_json::to_value(&snapshot).unwrap())
            .await
            .unwrap();

        let report = run_serialize(&parsed, &json).await.unwrap();
        assert_eq!(report.regions, 1);
        assert_eq!(report.records, 2);

        let plain: PlainSnapshot =
            serde_json::from_value(json.get(SNAPSHOT_KEY).await.unwrap().unwrap()).unwrap();
        let entries = &plain[&Region::Us][&Category::Cpu];
        assert_eq!(entries.len(), 2);
        for entry in entries {
            assert!(entry.get("category").is_none());
            assert!(entry.get("name").and_then(Value::as_str).is_some());
        }
    }

    #[tokio::test]
    async fn test_missing_parsed_snapshot_is_an_error() {
        let parsed = MemoryStore::new();
        let json = MemoryStore::new();

        let result = run_serialize(&parsed, &json).await;
        assert!(matches!(
            result,
            Err(HarvestError::SnapshotMissing { store: "parsed" })
        ));
    }
}
