//! Command-line driver for the harvest pipeline.
//!
//! Runs all four stages in order against disk-backed stores. Rerunning
//! after an interruption or a partial failure resumes from whatever the
//! checkpoints already hold.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use harvest::{
    enumerate_backlog, run_parse, run_publish, run_scrape, run_serialize, CatalogParser, Category,
    DiskStore, PublishConfig, Region, ScrapeConfig, WebDriverScraper,
};

#[derive(Parser, Debug)]
#[command(
    name = "harvest",
    about = "Scrape regional hardware catalogs into a published file tree"
)]
struct Args {
    /// Scrape up to N part+region pages concurrently
    #[arg(short = 'P', long, default_value_t = 1, value_name = "N")]
    parallel: usize,

    /// Directory for the raw page cache
    #[arg(long, env = "HARVEST_RAW_STORE", default_value = "/tmp/harvest-raw-cache")]
    raw_store: PathBuf,

    /// Directory for the parsed-record snapshot (default: ~/.harvest/parsed)
    #[arg(long, env = "HARVEST_PARSED_STORE")]
    parsed_store: Option<PathBuf>,

    /// Directory for the plain-data snapshot (default: ~/.harvest/json)
    #[arg(long, env = "HARVEST_JSON_STORE")]
    json_store: Option<PathBuf>,

    /// Root of the published artifact tree
    #[arg(long, env = "HARVEST_OUT_DIR", default_value = "docs")]
    out_dir: PathBuf,

    /// Path to the chromedriver binary
    #[arg(
        long,
        env = "HARVEST_DRIVER",
        default_value = "/usr/lib/chromium-browser/chromedriver"
    )]
    driver: PathBuf,

    /// Per-page fetch deadline in seconds
    #[arg(long, env = "HARVEST_FETCH_TIMEOUT_SECS", default_value_t = 120)]
    fetch_timeout_secs: u64,
}

/// Default location for a stage's state directory, under the user's home.
fn default_state_dir(sub: &str) -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir()
        .context("could not determine the home directory; pass --parsed-store/--json-store")?;
    Ok(home.join(".harvest").join(sub))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,harvest=debug".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let args = Args::parse();

    let raw_store = DiskStore::open(&args.raw_store)
        .await
        .with_context(|| format!("opening raw store at {}", args.raw_store.display()))?;
    let parsed_dir = match args.parsed_store.clone() {
        Some(dir) => dir,
        None => default_state_dir("parsed")?,
    };
    let parsed_store = DiskStore::open(&parsed_dir)
        .await
        .with_context(|| format!("opening parsed store at {}", parsed_dir.display()))?;
    let json_dir = match args.json_store.clone() {
        Some(dir) => dir,
        None => default_state_dir("json")?,
    };
    let json_store = DiskStore::open(&json_dir)
        .await
        .with_context(|| format!("opening json store at {}", json_dir.display()))?;

    let shutdown = CancellationToken::new();
    let interrupt = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling in-flight work");
            interrupt.cancel();
        }
    });

    let backlog = enumerate_backlog(&Category::ALL, &Region::ALL, &raw_store).await?;
    let scraper = WebDriverScraper::new(&args.driver);
    let config = ScrapeConfig::new()
        .with_parallel(args.parallel)
        .with_fetch_timeout(Duration::from_secs(args.fetch_timeout_secs));
    let report = run_scrape(backlog, &config, &raw_store, &scraper, &shutdown).await?;

    // Later stages expect a complete raw snapshot; stop here while the
    // checkpoints keep whatever this run banked.
    if !report.is_success() {
        for (item, cause) in &report.failed {
            error!(item = %item, error = %cause, "combo failed");
        }
        anyhow::bail!(
            "{} of {} scrapes failed; raw progress is kept, rerun to retry",
            report.failed.len(),
            report.failed.len() + report.completed.len(),
        );
    }

    run_parse(&raw_store, &parsed_store, &CatalogParser::new()).await?;
    run_serialize(&parsed_store, &json_store).await?;
    let publish = run_publish(&json_store, &PublishConfig::new(&args.out_dir)).await?;

    info!(
        regions = publish.regions,
        files = publish.files,
        "pipeline complete"
    );
    Ok(())
}
