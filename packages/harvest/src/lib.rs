//! Resumable harvesting pipeline for regional hardware catalogs.
//!
//! The pipeline runs in four stages, each checkpointed through a
//! [`CheckpointStore`] so an interrupted run picks up where it left off:
//!
//! 1. **Backlog** ([`pipeline::backlog`]): diff the full category x region
//!    matrix against the raw store to find what still needs fetching.
//! 2. **Scrape** ([`pipeline::scrape`]): fan the backlog out over a
//!    bounded worker pool; each completed page is merged into the raw
//!    store as soon as it lands.
//! 3. **Parse** ([`pipeline::parse`]): turn captured listings into typed
//!    [`Record`]s and checkpoint the full snapshot.
//! 4. **Serialize and publish** ([`pipeline::serialize`],
//!    [`pipeline::publish`]): reduce records to plain data, then write the
//!    per-region JSON and viewer HTML tree.
//!
//! The scrape and parse collaborators sit behind the [`PartScraper`] and
//! [`PartParser`] traits; [`testing`] provides mock implementations of
//! both.

pub mod error;
pub mod parsers;
pub mod pipeline;
pub mod scrapers;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export the main types for convenience
pub use error::{
    FetchError, FetchResult, HarvestError, IdentError, ParseError, ParseResult, Result,
    StoreError, StoreResult,
};
pub use parsers::CatalogParser;
pub use pipeline::{
    decode_payload, embedded_payload, encode_payload, enumerate_backlog, run_parse, run_publish,
    run_scrape, run_serialize, Backlog, ParseReport, PublishConfig, PublishReport, ScrapeConfig,
    ScrapeReport, SerializeReport,
};
pub use scrapers::WebDriverScraper;
pub use stores::{DiskStore, MemoryStore};
pub use testing::{MockParser, MockScraper};
pub use traits::{CheckpointStore, PartParser, PartScraper};
pub use types::{
    Category, CategoryMap, ParsedSnapshot, PlainSnapshot, Price, RawCategoryData, RawListing,
    Record, Region, WorkItem, SNAPSHOT_KEY,
};
