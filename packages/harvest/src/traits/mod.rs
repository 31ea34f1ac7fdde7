//! Trait seams between the pipeline stages and their collaborators.

pub mod parser;
pub mod scraper;
pub mod store;

pub use parser::PartParser;
pub use scraper::PartScraper;
pub use store::CheckpointStore;
