//! End-to-end pipeline tests.
//!
//! These drive the real stage functions over in-memory and on-disk stores,
//! with only the scraper mocked out.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use harvest::{
    decode_payload, embedded_payload, enumerate_backlog, run_parse, run_publish, run_scrape,
    run_serialize, CatalogParser, Category, CheckpointStore, DiskStore, MemoryStore, MockScraper,
    PublishConfig, Region, ScrapeConfig, SNAPSHOT_KEY,
};

const CATEGORIES: [Category; 2] = [Category::Cpu, Category::Memory];
const REGIONS: [Region; 2] = [Region::Us, Region::Uk];

async fn region_object(store: &impl CheckpointStore, region: &str) -> Map<String, Value> {
    match store.get(region).await.unwrap() {
        Some(Value::Object(map)) => map,
        other => panic!("expected object under {region}, got {other:?}"),
    }
}

#[tokio::test]
async fn test_full_pipeline_produces_artifacts() {
    let raw = MemoryStore::new();
    let parsed = MemoryStore::new();
    let json_store = MemoryStore::new();
    let scraper = MockScraper::new();
    let shutdown = CancellationToken::new();
    let config = ScrapeConfig::new().with_parallel(2);

    // Scrape the full matrix.
    let backlog = enumerate_backlog(&CATEGORIES, &REGIONS, &raw).await.unwrap();
    assert_eq!(backlog.remaining(), 4);
    let report = run_scrape(backlog, &config, &raw, &scraper, &shutdown)
        .await
        .unwrap();
    assert!(report.is_success());

    let us = region_object(&raw, "us").await;
    assert!(us.contains_key("cpu") && us.contains_key("memory"));

    // A rerun over the same store has nothing left to fetch.
    let fetches = scraper.calls().len();
    let backlog = enumerate_backlog(&CATEGORIES, &REGIONS, &raw).await.unwrap();
    assert!(backlog.is_empty());
    run_scrape(backlog, &config, &raw, &scraper, &shutdown)
        .await
        .unwrap();
    assert_eq!(scraper.calls().len(), fetches);

    // Parse and serialize into the single-key snapshot stores.
    let parse_report = run_parse(&raw, &parsed, &CatalogParser::new()).await.unwrap();
    assert_eq!(parse_report.regions, 2);
    assert_eq!(parsed.keys().await.unwrap(), vec![SNAPSHOT_KEY]);
    run_serialize(&parsed, &json_store).await.unwrap();

    // Publish the artifact tree.
    let tmp = TempDir::new().unwrap();
    let publish_report = run_publish(&json_store, &PublishConfig::new(tmp.path().join("docs")))
        .await
        .unwrap();
    assert_eq!(publish_report.regions, 2);
    assert_eq!(publish_report.files, 8);

    for region in ["us", "uk"] {
        for category in ["cpu", "memory"] {
            let dir = tmp.path().join("docs").join(region);
            assert!(dir.join(format!("{category}.json")).exists());
            assert!(dir.join(format!("{category}.html")).exists());
        }
    }

    // The viewer page embeds exactly the bytes of its JSON sibling.
    let json_bytes = tokio::fs::read(tmp.path().join("docs/us/cpu.json"))
        .await
        .unwrap();
    let entries: Vec<Value> = serde_json::from_slice(&json_bytes).unwrap();
    assert_eq!(entries.len(), 2);

    let html = tokio::fs::read_to_string(tmp.path().join("docs/us/cpu.html"))
        .await
        .unwrap();
    let payload = embedded_payload(&html).unwrap();
    assert_eq!(decode_payload(&payload).unwrap(), json_bytes);
}

#[tokio::test]
async fn test_interrupted_run_resumes_from_disk() {
    let tmp = TempDir::new().unwrap();
    let raw_dir = tmp.path().join("raw");
    let shutdown = CancellationToken::new();
    let config = ScrapeConfig::new().with_parallel(2);
    let regions = [Region::Us];

    {
        let raw = DiskStore::open(&raw_dir).await.unwrap();
        let scraper = MockScraper::new().fail_for(Region::Us, Category::Memory);
        let backlog = enumerate_backlog(&CATEGORIES, &regions, &raw).await.unwrap();
        let report = run_scrape(backlog, &config, &raw, &scraper, &shutdown)
            .await
            .unwrap();
        assert_eq!(report.completed.len(), 1);
        assert_eq!(report.failed.len(), 1);
    }

    // A fresh process over the same directory only refetches the failure.
    let raw = DiskStore::open(&raw_dir).await.unwrap();
    let scraper = MockScraper::new();
    let backlog = enumerate_backlog(&CATEGORIES, &regions, &raw).await.unwrap();
    assert_eq!(backlog.remaining(), 1);
    assert_eq!(backlog.items[0].category, Category::Memory);

    let report = run_scrape(backlog, &config, &raw, &scraper, &shutdown)
        .await
        .unwrap();
    assert!(report.is_success());
    assert_eq!(scraper.calls().len(), 1);

    let us = region_object(&raw, "us").await;
    assert!(us.contains_key("cpu") && us.contains_key("memory"));
}

// The two tests below pin down why the raw store exposes an atomic merge:
// a get-modify-put cycle interleaved across workers drops fields, while
// merge keeps every concurrent write.

#[tokio::test]
async fn test_naive_read_modify_write_loses_concurrent_updates() {
    let store = MemoryStore::new();
    store.put("us", json!({})).await.unwrap();
    let barrier = Arc::new(tokio::sync::Barrier::new(2));

    let update_via_get_put = |field: &'static str| {
        let store = &store;
        let barrier = Arc::clone(&barrier);
        async move {
            let mut object = region_object(store, "us").await;
            barrier.wait().await;
            object.insert(field.to_string(), json!({}));
            store.put("us", Value::Object(object)).await.unwrap();
        }
    };
    tokio::join!(update_via_get_put("cpu"), update_via_get_put("memory"));

    assert_eq!(region_object(&store, "us").await.len(), 1);
}

#[tokio::test]
async fn test_atomic_merge_keeps_concurrent_updates() {
    let store = MemoryStore::new();
    store.put("us", json!({})).await.unwrap();
    let barrier = Arc::new(tokio::sync::Barrier::new(2));

    let update_via_merge = |field: &'static str| {
        let store = &store;
        let barrier = Arc::clone(&barrier);
        async move {
            barrier.wait().await;
            let mut patch = Map::new();
            patch.insert(field.to_string(), json!({}));
            store.merge("us", patch).await.unwrap();
        }
    };
    tokio::join!(update_via_merge("cpu"), update_via_merge("memory"));

    assert_eq!(region_object(&store, "us").await.len(), 2);
}
