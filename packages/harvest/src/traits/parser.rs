//! Parse collaborator abstraction.

use crate::error::ParseResult;
use crate::types::catalog::{Category, Region};
use crate::types::record::Record;
use crate::types::snapshot::RawCategoryData;

/// Turns captured page data into normalized records.
///
/// Parsing is pure CPU work over data already in memory, so this trait is
/// synchronous; the parse stage calls it inline while walking the raw
/// snapshot.
pub trait PartParser: Send + Sync {
    /// Parse every listing captured for `category` in `region`.
    fn parse(
        &self,
        region: Region,
        category: Category,
        data: &RawCategoryData,
    ) -> ParseResult<Vec<Record>>;
}
