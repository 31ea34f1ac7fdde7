//! Snapshot shapes shared by the pipeline stages and checkpoint stores.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::catalog::{Category, Region};
use crate::types::record::Record;

/// Store key the parsed and plain-data snapshots live under.
///
/// Each full run overwrites the previous snapshot wholesale, so a single
/// well-known key is all those stores ever hold.
pub const SNAPSHOT_KEY: &str = "current";

/// Raw scrape output for one (region, category) page, as captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawListing {
    /// Listing title as displayed, untrimmed of model suffixes.
    pub title: String,

    /// Spec cell texts in page order. Meaning is positional and
    /// category-dependent until the parse stage names them.
    pub fields: Vec<String>,

    /// Price cell text, absent when the cell was empty or missing.
    pub price: Option<String>,
}

impl RawListing {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
            price: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }
}

/// Everything captured from one category page in one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCategoryData {
    /// Manufacturer names from the page's filter sidebar.
    pub manufacturers: Vec<String>,

    /// Product rows in page order.
    pub listings: Vec<RawListing>,

    /// When the page was fetched.
    pub fetched_at: DateTime<Utc>,
}

impl RawCategoryData {
    pub fn new(manufacturers: Vec<String>, listings: Vec<RawListing>) -> Self {
        Self {
            manufacturers,
            listings,
            fetched_at: Utc::now(),
        }
    }

    pub fn with_fetched_at(mut self, fetched_at: DateTime<Utc>) -> Self {
        self.fetched_at = fetched_at;
        self
    }
}

/// The value stored under a region key in the raw store: one entry per
/// category already captured for that region.
pub type CategoryMap = BTreeMap<Category, RawCategoryData>;

/// Full parsed snapshot, region first.
pub type ParsedSnapshot = BTreeMap<Region, BTreeMap<Category, Vec<Record>>>;

/// Schema-erased counterpart of [`ParsedSnapshot`] held by the plain-data
/// store and consumed by the publish stage.
pub type PlainSnapshot = BTreeMap<Region, BTreeMap<Category, Vec<Value>>>;
