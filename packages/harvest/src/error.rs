//! Typed errors for the harvest library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

use crate::types::catalog::{Category, Region};

/// Errors that can occur while running the pipeline.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Checkpoint store operation failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Scrape collaborator failed
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Parse collaborator failed
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A stage's input snapshot has not been produced yet
    #[error("no {store} snapshot found; run the earlier stages first")]
    SnapshotMissing { store: &'static str },

    /// A plain-data entry failed the pre-publish schema check
    #[error("record for {region}/{category} failed schema validation: {source}")]
    Validation {
        region: Region,
        category: Category,
        #[source]
        source: serde_json::Error,
    },

    /// Embedded payload could not be decoded
    #[error("payload decode error: {0}")]
    Payload(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// JSON conversion error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error while writing artifacts
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while fetching raw category data.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Browser driver failed to start or respond
    #[error("driver error: {0}")]
    Driver(String),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Page loaded but did not contain the expected structure
    #[error("malformed page: {reason}")]
    MalformedPage { reason: String },

    /// Fetch exceeded the configured deadline
    #[error("timed out fetching {region}/{category}")]
    Timeout { region: Region, category: Category },

    /// Fetch was cancelled before completion
    #[error("fetch cancelled")]
    Cancelled,
}

/// Errors that can occur while parsing raw listings into records.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A raw listing could not be mapped onto its category schema
    #[error("listing {index} in {region}/{category} is malformed: {reason}")]
    MalformedListing {
        region: Region,
        category: Category,
        index: usize,
        reason: String,
    },
}

/// Errors that can occur in a checkpoint store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored entry exists but could not be decoded
    #[error("corrupt entry for key {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Value could not be encoded for storage
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Key contains characters the store cannot represent
    #[error("invalid store key: {key}")]
    InvalidKey { key: String },

    /// Merge target exists but is not a JSON object
    #[error("value for key {key} is not a JSON object")]
    NotAnObject { key: String },
}

/// Errors from parsing category or region identifiers.
#[derive(Debug, Error)]
pub enum IdentError {
    /// Identifier does not name a supported category
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// Identifier does not name a supported region
    #[error("unknown region: {0}")]
    UnknownRegion(String),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for parse operations.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
