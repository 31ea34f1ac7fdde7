//! WebDriver-backed scraper for regional storefront pages.
//!
//! Listing pages render their product table client side, so a plain HTTP
//! GET returns an empty shell. Each fetch launches a fresh chromedriver on
//! its own port, drives one headless session through the W3C wire
//! protocol, captures the rendered source and extracts the parts we keep.
//! One process per fetch keeps concurrent workers from sharing browser
//! state.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};
use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::error::{FetchError, FetchResult};
use crate::traits::scraper::PartScraper;
use crate::types::catalog::{Category, Region};
use crate::types::snapshot::{RawCategoryData, RawListing};

const DEFAULT_BASE_DOMAIN: &str = "pcpartpicker.com";
const FIRST_DRIVER_PORT: u16 = 9515;

/// [`PartScraper`] that drives a local chromedriver binary.
pub struct WebDriverScraper {
    driver_path: PathBuf,
    base_domain: String,
    next_port: AtomicU16,
    client: reqwest::Client,
}

impl WebDriverScraper {
    /// Create a scraper around the driver binary at `driver_path`.
    pub fn new(driver_path: impl Into<PathBuf>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            driver_path: driver_path.into(),
            base_domain: DEFAULT_BASE_DOMAIN.to_string(),
            next_port: AtomicU16::new(FIRST_DRIVER_PORT),
            client,
        }
    }

    /// Override the storefront domain, mainly for tests.
    pub fn with_base_domain(mut self, base_domain: impl Into<String>) -> Self {
        self.base_domain = base_domain.into();
        self
    }

    /// URL of the category listing page for a region.
    ///
    /// The US storefront lives on the bare domain; every other region is a
    /// subdomain of it.
    pub fn listing_url(&self, region: Region, category: Category) -> String {
        match region {
            Region::Us => format!("https://{}/products/{}/", self.base_domain, category),
            _ => format!(
                "https://{}.{}/products/{}/",
                region, self.base_domain, category
            ),
        }
    }

    async fn load_page(&self, url: &str) -> FetchResult<String> {
        let port = self.next_port.fetch_add(1, Ordering::Relaxed);
        let mut driver = self.launch_driver(port).await?;
        let result = self.drive_session(port, url).await;
        let _ = driver.start_kill();
        let _ = driver.wait().await;
        result
    }

    async fn launch_driver(&self, port: u16) -> FetchResult<Child> {
        let mut child = Command::new(&self.driver_path)
            .arg(format!("--port={port}"))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            // A timed-out or cancelled fetch drops this future mid-session;
            // the driver goes down with it instead of lingering as an orphan.
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                FetchError::Driver(format!(
                    "failed to launch {}: {e}",
                    self.driver_path.display()
                ))
            })?;

        let status_url = format!("http://127.0.0.1:{port}/status");
        for _ in 0..20 {
            if let Ok(Some(status)) = child.try_wait() {
                return Err(FetchError::Driver(format!("driver exited early: {status}")));
            }
            if let Ok(response) = self.client.get(&status_url).send().await {
                if response.status().is_success() {
                    return Ok(child);
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let _ = child.start_kill();
        let _ = child.wait().await;
        Err(FetchError::Driver(format!(
            "driver on port {port} never became ready"
        )))
    }

    async fn drive_session(&self, port: u16, url: &str) -> FetchResult<String> {
        let base = format!("http://127.0.0.1:{port}");
        let created = self
            .post_json(
                &format!("{base}/session"),
                json!({
                    "capabilities": {
                        "alwaysMatch": {
                            "goog:chromeOptions": {
                                "args": ["--headless=new", "--disable-gpu"]
                            }
                        }
                    }
                }),
            )
            .await?;
        let session_id = created
            .pointer("/value/sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| FetchError::Driver("no sessionId in driver response".to_string()))?
            .to_string();

        let source = self.navigate_and_capture(&base, &session_id, url).await;
        // Tear the session down whether or not the capture worked.
        let _ = self
            .client
            .delete(format!("{base}/session/{session_id}"))
            .send()
            .await;

        let source = source?;
        source
            .pointer("/value")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| FetchError::Driver("no page source in driver response".to_string()))
    }

    async fn navigate_and_capture(
        &self,
        base: &str,
        session_id: &str,
        url: &str,
    ) -> FetchResult<Value> {
        self.post_json(&format!("{base}/session/{session_id}/url"), json!({ "url": url }))
            .await?;
        self.get_json(&format!("{base}/session/{session_id}/source"))
            .await
    }

    async fn post_json(&self, url: &str, body: Value) -> FetchResult<Value> {
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))?;
        response
            .json()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))
    }

    async fn get_json(&self, url: &str) -> FetchResult<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))?;
        response
            .json()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))
    }
}

#[async_trait]
impl PartScraper for WebDriverScraper {
    async fn fetch(&self, region: Region, category: Category) -> FetchResult<RawCategoryData> {
        let url = self.listing_url(region, category);
        info!(url = %url, "loading category page");

        let html = self.load_page(&url).await?;
        let manufacturers = extract_manufacturers(&html);
        let listings = extract_listings(&html)?;
        debug!(
            manufacturers = manufacturers.len(),
            listings = listings.len(),
            "extracted category page"
        );
        Ok(RawCategoryData::new(manufacturers, listings))
    }
}

/// Manufacturer names from the filter sidebar's checkbox labels.
fn extract_manufacturers(html: &str) -> Vec<String> {
    let label = Regex::new(r#"<label[^>]*for="m_[^"]*"[^>]*>([^<]+)</label>"#).unwrap();
    label
        .captures_iter(html)
        .map(|c| c[1].trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Product rows from the listing table.
fn extract_listings(html: &str) -> FetchResult<Vec<RawListing>> {
    let row = Regex::new(r#"(?s)<tr[^>]*class="[^"]*tr__product[^"]*"[^>]*>(.*?)</tr>"#).unwrap();
    let name = Regex::new(r#"(?s)<td[^>]*class="[^"]*td__name[^"]*"[^>]*>(.*?)</td>"#).unwrap();
    let spec = Regex::new(r#"(?s)<td[^>]*class="[^"]*td__spec[^"]*"[^>]*>(.*?)</td>"#).unwrap();
    let price = Regex::new(r#"(?s)<td[^>]*class="[^"]*td__price[^"]*"[^>]*>(.*?)</td>"#).unwrap();
    // Spec cells repeat their column header in an <h6>; only the value text
    // after it is the field.
    let header = Regex::new(r"(?s)<h6[^>]*>.*?</h6>").unwrap();

    let mut listings = Vec::new();
    for row_cap in row.captures_iter(html) {
        let row_html = &row_cap[1];
        let title = name
            .captures(row_html)
            .map(|c| strip_tags(&c[1]))
            .unwrap_or_default();
        if title.is_empty() {
            // Spacer and ad rows carry the product class but no name cell.
            continue;
        }

        let mut listing = RawListing::new(title);
        for spec_cap in spec.captures_iter(row_html) {
            listing.fields.push(strip_tags(&header.replace_all(&spec_cap[1], " ")));
        }
        if let Some(price_cap) = price.captures(row_html) {
            let text = strip_tags(&price_cap[1]);
            if !text.is_empty() {
                listing.price = Some(text);
            }
        }
        listings.push(listing);
    }

    if listings.is_empty() {
        // Zero rows means the page markup changed or the render never
        // finished; error out instead of caching an empty category.
        return Err(FetchError::MalformedPage {
            reason: "no product rows found".to_string(),
        });
    }
    Ok(listings)
}

/// Drop tags and collapse whitespace down to single spaces.
fn strip_tags(html: &str) -> String {
    let tag = Regex::new(r"<[^>]*>").unwrap();
    let text = tag.replace_all(html, " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_PAGE: &str = r#"
        <section class="sidebar">
          <input id="m_1"><label for="m_1">AMD</label>
          <input id="m_2"><label for="m_2"> Intel </label>
        </section>
        <table>
          <tr class="tr__product">
            <td class="td__name"><p>Ryzen 5 5600</p></td>
            <td class="td__spec"><h6>Cores</h6>6</td>
            <td class="td__spec"><h6>Clock</h6>3.5 GHz</td>
            <td class="td__price">$129.99<a>Add</a></td>
          </tr>
          <tr class="tr__product">
            <td class="td__name"><p>Core i5-12400F</p></td>
            <td class="td__spec"><h6>Cores</h6>6</td>
            <td class="td__price"></td>
          </tr>
        </table>
    "#;

    fn scraper() -> WebDriverScraper {
        WebDriverScraper::new("/usr/lib/chromium-browser/chromedriver")
    }

    #[test]
    fn test_listing_url_per_region() {
        let scraper = scraper();
        assert_eq!(
            scraper.listing_url(Region::Us, Category::Cpu),
            "https://pcpartpicker.com/products/cpu/",
        );
        assert_eq!(
            scraper.listing_url(Region::Uk, Category::CpuCooler),
            "https://uk.pcpartpicker.com/products/cpu-cooler/",
        );

        let custom = scraper.with_base_domain("example.test");
        assert_eq!(
            custom.listing_url(Region::De, Category::Memory),
            "https://de.example.test/products/memory/",
        );
    }

    #[test]
    fn test_extract_manufacturers() {
        assert_eq!(extract_manufacturers(LISTING_PAGE), vec!["AMD", "Intel"]);
        assert!(extract_manufacturers("<p>no sidebar</p>").is_empty());
    }

    #[test]
    fn test_extract_listings() {
        let listings = extract_listings(LISTING_PAGE).unwrap();
        assert_eq!(listings.len(), 2);

        assert_eq!(listings[0].title, "Ryzen 5 5600");
        assert_eq!(listings[0].fields, vec!["6", "3.5 GHz"]);
        assert_eq!(listings[0].price.as_deref(), Some("$129.99 Add"));

        assert_eq!(listings[1].title, "Core i5-12400F");
        assert_eq!(listings[1].price, None);
    }

    #[test]
    fn test_empty_page_is_malformed() {
        let result = extract_listings("<table></table>");
        assert!(matches!(result, Err(FetchError::MalformedPage { .. })));
    }

    #[test]
    fn test_strip_tags_collapses_whitespace() {
        assert_eq!(strip_tags("<p>  Ryzen\n 5   <b>5600</b></p>"), "Ryzen 5 5600");
        assert_eq!(strip_tags("<td></td>"), "");
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_dropped_fetch_kills_driver() {
        use std::os::unix::fs::PermissionsExt;

        // Stand-in driver that records its pid and stalls without ever
        // listening, so the fetch is still waiting on readiness when the
        // deadline fires.
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("driver.pid");
        let script = dir.path().join("stall-driver.sh");
        std::fs::write(
            &script,
            format!("#!/bin/sh\necho $$ > \"{}\"\nexec sleep 600\n", pid_file.display()),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let scraper = WebDriverScraper::new(&script);
        let fetch = scraper.fetch(Region::Us, Category::Cpu);
        let timed_out = tokio::time::timeout(Duration::from_millis(300), fetch).await;
        assert!(timed_out.is_err());

        let pid: u32 = std::fs::read_to_string(&pid_file)
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        for _ in 0..40 {
            if driver_gone(pid) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("driver process {pid} survived the dropped fetch");
    }

    /// A killed child sits in the process table as a zombie until the
    /// runtime reaps it; both gone and zombie count as dead here.
    #[cfg(target_os = "linux")]
    fn driver_gone(pid: u32) -> bool {
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Ok(stat) => stat.contains(") Z "),
            Err(_) => true,
        }
    }
}
