//! Scrape collaborator abstraction.

use async_trait::async_trait;

use crate::error::FetchResult;
use crate::types::catalog::{Category, Region};
use crate::types::snapshot::RawCategoryData;

/// Fetches one category page from one regional storefront.
///
/// The scrape stage drives this per work item and owns the timeout and
/// cancellation around each call, so implementations only need to fetch.
#[async_trait]
pub trait PartScraper: Send + Sync {
    /// Fetch and extract the category page for `category` in `region`.
    async fn fetch(&self, region: Region, category: Category) -> FetchResult<RawCategoryData>;
}
