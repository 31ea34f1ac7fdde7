//! Stage one: work out which (region, category) pages still need scraping.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::traits::store::CheckpointStore;
use crate::types::catalog::{Category, Region, WorkItem};

/// The work remaining for a scrape run.
#[derive(Debug, Clone)]
pub struct Backlog {
    /// Uncached combinations, ordered region-major.
    pub items: Vec<WorkItem>,

    /// Size of the full category x region matrix.
    pub total: usize,
}

impl Backlog {
    /// How many combinations still need fetching.
    pub fn remaining(&self) -> usize {
        self.items.len()
    }

    /// Whether every combination is already cached.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Enumerate every (region, category) combination not already present in
/// the raw store.
///
/// A region with no entry yet is seeded with an empty object so later
/// merges and rescans always find a JSON object under every region key.
/// Entries are never invalidated here: once a category appears under a
/// region it stays cached until the caller clears the store out of band.
pub async fn enumerate_backlog<S>(
    categories: &[Category],
    regions: &[Region],
    raw_store: &S,
) -> Result<Backlog>
where
    S: CheckpointStore,
{
    let mut items = Vec::new();
    for region in regions {
        let cached = match raw_store.get(region.as_str()).await? {
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(StoreError::NotAnObject {
                    key: region.as_str().to_string(),
                }
                .into())
            }
            None => {
                let empty = Map::new();
                raw_store
                    .put(region.as_str(), Value::Object(empty.clone()))
                    .await?;
                empty
            }
        };

        for category in categories {
            if !cached.contains_key(category.as_str()) {
                items.push(WorkItem::new(*category, *region));
            }
        }
    }

    let backlog = Backlog {
        items,
        total: categories.len() * regions.len(),
    };
    debug!(
        remaining = backlog.remaining(),
        total = backlog.total,
        "computed scrape backlog"
    );
    Ok(backlog)
}
