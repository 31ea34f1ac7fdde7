//! Stage four, second half: write the per-region artifact tree.
//!
//! Every (region, category) pair gets two files: the plain JSON array and
//! a small HTML viewer page whose body embeds the same JSON, gzipped and
//! URL-safe base64 encoded, so the page stays self-contained and inert
//! until a client decodes it.

use std::io::{Read, Write};
use std::path::PathBuf;

use base64::{engine::general_purpose::URL_SAFE, Engine};
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use tracing::info;

use crate::error::{HarvestError, Result, StoreError};
use crate::traits::store::CheckpointStore;
use crate::types::record::Record;
use crate::types::snapshot::{PlainSnapshot, SNAPSHOT_KEY};

const VIEWER_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Data</title>
  </head>
  <body>
  {payload}
  </body>
</html>"#;

/// Where the publish stage writes its artifact tree.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Root of the output tree; region subdirectories go underneath.
    pub out_dir: PathBuf,
}

impl PublishConfig {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }
}

/// Outcome of a publish run.
#[derive(Debug)]
pub struct PublishReport {
    /// Region directories written.
    pub regions: usize,

    /// Artifact files written, counting both JSON and HTML.
    pub files: usize,
}

/// Publish the plain-data snapshot as a per-region file tree.
///
/// Each entry is checked against its category schema before anything is
/// written for that category; an entry that no longer decodes fails the
/// stage rather than producing an artifact that disagrees with the schema.
pub async fn run_publish<S>(json_store: &S, config: &PublishConfig) -> Result<PublishReport>
where
    S: CheckpointStore,
{
    let value = json_store
        .get(SNAPSHOT_KEY)
        .await?
        .ok_or(HarvestError::SnapshotMissing { store: "json" })?;
    let snapshot: PlainSnapshot =
        serde_json::from_value(value).map_err(|source| StoreError::Corrupt {
            key: SNAPSHOT_KEY.to_string(),
            source,
        })?;

    tokio::fs::create_dir_all(&config.out_dir).await?;

    let mut files = 0;
    for (region, by_category) in &snapshot {
        let region_dir = config.out_dir.join(region.as_str());
        tokio::fs::create_dir_all(&region_dir).await?;

        for (category, entries) in by_category {
            for entry in entries {
                Record::from_plain(*category, entry).map_err(|source| {
                    HarvestError::Validation {
                        region: *region,
                        category: *category,
                        source,
                    }
                })?;
            }

            let json_text = serde_json::to_string(entries)?;
            let payload = encode_payload(json_text.as_bytes())?;
            let html = VIEWER_TEMPLATE.replace("{payload}", &payload);

            tokio::fs::write(region_dir.join(format!("{category}.json")), &json_text).await?;
            tokio::fs::write(region_dir.join(format!("{category}.html")), html).await?;
            files += 2;
        }
        info!(region = %region, categories = by_category.len(), "published region artifacts");
    }

    let regions = snapshot.len();
    info!(regions, files, "publish stage finished");
    Ok(PublishReport { regions, files })
}

/// Gzip `bytes` and encode the result as URL-safe base64.
pub fn encode_payload(bytes: &[u8]) -> std::io::Result<String> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    let compressed = encoder.finish()?;
    Ok(URL_SAFE.encode(compressed))
}

/// Invert [`encode_payload`]: base64 decode, then gunzip.
pub fn decode_payload(encoded: &str) -> Result<Vec<u8>> {
    let compressed = URL_SAFE
        .decode(encoded.trim())
        .map_err(|e| HarvestError::Payload(Box::new(e)))?;
    let mut decoder = GzDecoder::new(&compressed[..]);
    let mut bytes = Vec::new();
    decoder.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Pull the embedded payload back out of a viewer page body.
pub fn embedded_payload(html: &str) -> Option<String> {
    let start = html.find("<body>")? + "<body>".len();
    let end = html.find("</body>")?;
    if end < start {
        return None;
    }
    Some(html[start..end].trim().to_string())
}
