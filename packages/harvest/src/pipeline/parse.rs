//! Stage three: turn the raw snapshot into normalized records.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::error::{Result, StoreError};
use crate::traits::parser::PartParser;
use crate::traits::store::CheckpointStore;
use crate::types::catalog::Region;
use crate::types::snapshot::{CategoryMap, ParsedSnapshot, SNAPSHOT_KEY};

/// Outcome of a parse run.
#[derive(Debug)]
pub struct ParseReport {
    /// Regions found in the raw store and parsed.
    pub regions: usize,

    /// Records produced across all regions and categories.
    pub records: usize,
}

/// Parse everything the raw store holds and checkpoint the result.
///
/// The parsed snapshot is written in one shot under [`SNAPSHOT_KEY`],
/// replacing whatever the previous run left there. Any malformed listing
/// fails the whole stage; the raw store keeps the page data, so the fix is
/// a parser change and a rerun rather than a rescrape.
pub async fn run_parse<S, T, P>(
    raw_store: &S,
    parsed_store: &T,
    parser: &P,
) -> Result<ParseReport>
where
    S: CheckpointStore,
    T: CheckpointStore,
    P: PartParser,
{
    let mut snapshot = ParsedSnapshot::new();
    let mut records = 0;

    for key in raw_store.keys().await? {
        let Ok(region) = key.parse::<Region>() else {
            warn!(key = %key, "ignoring unrecognized raw-store key");
            continue;
        };
        let Some(value) = raw_store.get(&key).await? else {
            continue;
        };
        let map: CategoryMap =
            serde_json::from_value(value).map_err(|source| StoreError::Corrupt {
                key: key.clone(),
                source,
            })?;

        info!(region = %region, categories = map.len(), "parsing region");
        let mut by_category = BTreeMap::new();
        for (category, data) in &map {
            let parsed = parser.parse(region, *category, data)?;
            records += parsed.len();
            by_category.insert(*category, parsed);
        }
        snapshot.insert(region, by_category);
    }

    let regions = snapshot.len();
    parsed_store
        .put(SNAPSHOT_KEY, serde_json::to_value(&snapshot)?)
        .await?;

    info!(regions, records, "parse stage finished");
    Ok(ParseReport { regions, records })
}
