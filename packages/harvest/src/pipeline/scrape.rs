//! Stage two: fan the backlog out over a bounded worker pool.
//!
//! Each work item runs in isolation: its fetch is wrapped in a timeout and
//! a cancellation watch, and its result is merged into the raw store from
//! inside the worker, so a failure never discards what other workers
//! already banked. Fetch failures are collected and reported together at
//! the end of the stage; only store failures abort the run.

use std::time::Duration;

use futures::{stream, StreamExt};
use serde_json::Map;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{FetchError, FetchResult, HarvestError, Result, StoreError, StoreResult};
use crate::pipeline::backlog::Backlog;
use crate::traits::scraper::PartScraper;
use crate::traits::store::CheckpointStore;
use crate::types::catalog::WorkItem;
use crate::types::snapshot::RawCategoryData;

/// Tuning knobs for the scrape stage.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Upper bound on in-flight fetches.
    pub parallel: usize,

    /// Deadline applied to each individual fetch.
    pub fetch_timeout: Duration,
}

impl ScrapeConfig {
    /// Sequential scraping with a two minute per-fetch deadline.
    pub fn new() -> Self {
        Self {
            parallel: 1,
            fetch_timeout: Duration::from_secs(120),
        }
    }

    /// Set the worker pool size.
    pub fn with_parallel(mut self, parallel: usize) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the per-fetch deadline.
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// What happened to each work item in a scrape run.
#[derive(Debug)]
pub struct ScrapeReport {
    /// Items fetched and checkpointed this run.
    pub completed: Vec<WorkItem>,

    /// Items whose fetch failed, with the error that stopped each one.
    pub failed: Vec<(WorkItem, FetchError)>,

    /// Items that were already cached and never entered the pool.
    pub skipped: usize,
}

impl ScrapeReport {
    /// Whether every attempted item completed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

enum ItemOutcome {
    Done,
    FetchFailed(FetchError),
    StoreFailed(StoreError),
}

/// Run the scrape stage over `backlog`.
///
/// Completed items are merged into the raw store as they finish, one
/// category field per merge, so progress survives even when the run is
/// later interrupted. The report lists every fetch failure; the run only
/// errors out when the store itself fails.
pub async fn run_scrape<S, F>(
    backlog: Backlog,
    config: &ScrapeConfig,
    raw_store: &S,
    scraper: &F,
    shutdown: &CancellationToken,
) -> Result<ScrapeReport>
where
    S: CheckpointStore,
    F: PartScraper,
{
    let skipped = backlog.total - backlog.remaining();
    info!(
        remaining = backlog.remaining(),
        total = backlog.total,
        workers = config.parallel,
        "about to scrape uncached part+region combos"
    );

    let tasks = backlog.items.into_iter().map(|item| async move {
        let outcome = scrape_item(item, config, raw_store, scraper, shutdown).await;
        (item, outcome)
    });
    let mut outcomes = stream::iter(tasks).buffer_unordered(config.parallel.max(1));

    let mut completed = Vec::new();
    let mut failed = Vec::new();
    while let Some((item, outcome)) = outcomes.next().await {
        match outcome {
            ItemOutcome::Done => completed.push(item),
            ItemOutcome::FetchFailed(error) => {
                warn!(item = %item, error = %error, "scrape failed, moving on");
                failed.push((item, error));
            }
            ItemOutcome::StoreFailed(error) => return Err(HarvestError::Store(error)),
        }
    }

    info!(
        completed = completed.len(),
        failed = failed.len(),
        skipped,
        "scrape stage finished"
    );
    Ok(ScrapeReport {
        completed,
        failed,
        skipped,
    })
}

async fn scrape_item<S, F>(
    item: WorkItem,
    config: &ScrapeConfig,
    raw_store: &S,
    scraper: &F,
    shutdown: &CancellationToken,
) -> ItemOutcome
where
    S: CheckpointStore,
    F: PartScraper,
{
    let data = match fetch_one(item, config, scraper, shutdown).await {
        Ok(data) => data,
        Err(error) => return ItemOutcome::FetchFailed(error),
    };
    match store_item(item, &data, raw_store).await {
        Ok(()) => {
            info!(
                region = %item.region,
                category = %item.category,
                listings = data.listings.len(),
                "finished with part+region combo"
            );
            ItemOutcome::Done
        }
        Err(error) => ItemOutcome::StoreFailed(error),
    }
}

async fn fetch_one<F>(
    item: WorkItem,
    config: &ScrapeConfig,
    scraper: &F,
    shutdown: &CancellationToken,
) -> FetchResult<RawCategoryData>
where
    F: PartScraper,
{
    if shutdown.is_cancelled() {
        return Err(FetchError::Cancelled);
    }
    tokio::select! {
        _ = shutdown.cancelled() => Err(FetchError::Cancelled),
        fetched = timeout(config.fetch_timeout, scraper.fetch(item.region, item.category)) => {
            match fetched {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout {
                    region: item.region,
                    category: item.category,
                }),
            }
        }
    }
}

async fn store_item<S>(item: WorkItem, data: &RawCategoryData, raw_store: &S) -> StoreResult<()>
where
    S: CheckpointStore,
{
    let value = serde_json::to_value(data)?;
    let mut patch = Map::new();
    patch.insert(item.category.as_str().to_string(), value);
    raw_store.merge(item.region.as_str(), patch).await
}
