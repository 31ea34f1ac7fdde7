//! Mock collaborators for testing.
//!
//! Provides scraper and parser implementations with predefined responses
//! and call tracking, plus generators for deterministic sample data.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{FetchError, FetchResult, ParseError, ParseResult};
use crate::traits::parser::PartParser;
use crate::traits::scraper::PartScraper;
use crate::types::catalog::{Category, Region, WorkItem};
use crate::types::record::{
    Case, CaseFan, Cpu, CpuCooler, ExternalHardDrive, FanController, Headphones,
    InternalHardDrive, Keyboard, Memory, Monitor, Motherboard, Mouse, OpticalDrive, PowerSupply,
    Record, SoundCard, Speakers, ThermalPaste, Ups, VideoCard, WiredNetworkCard,
    WirelessNetworkCard,
};
use crate::types::snapshot::{RawCategoryData, RawListing};

/// Mock scraper with predefined pages and call tracking.
#[derive(Debug, Clone, Default)]
pub struct MockScraper {
    pages: Arc<RwLock<HashMap<(Region, Category), RawCategoryData>>>,
    failures: Arc<RwLock<HashSet<(Region, Category)>>>,
    delay: Arc<RwLock<Option<Duration>>>,
    calls: Arc<RwLock<Vec<WorkItem>>>,
}

impl MockScraper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Predefine the page returned for one (region, category) combination.
    pub fn with_page(self, region: Region, category: Category, data: RawCategoryData) -> Self {
        self.pages.write().unwrap().insert((region, category), data);
        self
    }

    /// Make fetches for one combination fail with an HTTP error.
    pub fn fail_for(self, region: Region, category: Category) -> Self {
        self.failures.write().unwrap().insert((region, category));
        self
    }

    /// Delay every fetch, for exercising timeouts.
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.write().unwrap() = Some(delay);
        self
    }

    /// Every fetch made so far, in call order.
    pub fn calls(&self) -> Vec<WorkItem> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl PartScraper for MockScraper {
    async fn fetch(&self, region: Region, category: Category) -> FetchResult<RawCategoryData> {
        self.calls
            .write()
            .unwrap()
            .push(WorkItem::new(category, region));

        // Copy the delay out so no lock guard is held across the await.
        let delay = *self.delay.read().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failures.read().unwrap().contains(&(region, category)) {
            return Err(FetchError::Http(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "mock connection refused",
            ))));
        }

        let predefined = self.pages.read().unwrap().get(&(region, category)).cloned();
        Ok(predefined.unwrap_or_else(|| default_category_data(region, category)))
    }
}

/// Mock parser that emits one sample record per listing.
#[derive(Debug, Clone, Default)]
pub struct MockParser {
    failures: Arc<RwLock<HashSet<(Region, Category)>>>,
    calls: Arc<RwLock<Vec<(Region, Category)>>>,
}

impl MockParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make parses for one combination fail with a malformed listing.
    pub fn fail_for(self, region: Region, category: Category) -> Self {
        self.failures.write().unwrap().insert((region, category));
        self
    }

    /// Every parse made so far, in call order.
    pub fn calls(&self) -> Vec<(Region, Category)> {
        self.calls.read().unwrap().clone()
    }
}

impl PartParser for MockParser {
    fn parse(
        &self,
        region: Region,
        category: Category,
        data: &RawCategoryData,
    ) -> ParseResult<Vec<Record>> {
        self.calls.write().unwrap().push((region, category));

        if self.failures.read().unwrap().contains(&(region, category)) {
            return Err(ParseError::MalformedListing {
                region,
                category,
                index: 0,
                reason: "mock parser failure".to_string(),
            });
        }

        let manufacturer = data
            .manufacturers
            .first()
            .map(String::as_str)
            .unwrap_or("Generic");
        Ok(data
            .listings
            .iter()
            .map(|listing| sample_record(category, &listing.title, manufacturer))
            .collect())
    }
}

/// Deterministic page data for one (region, category) combination.
pub fn default_category_data(region: Region, category: Category) -> RawCategoryData {
    let listings = vec![
        RawListing::new(format!("Acme {category} One ({region})"))
            .with_field("8")
            .with_field("Standard")
            .with_price("$129.99"),
        RawListing::new(format!("Zenith {category} Two ({region})")).with_price("$89.50"),
    ];
    RawCategoryData::new(vec!["Acme".to_string(), "Zenith".to_string()], listings)
}

/// A minimal record of the given category.
pub fn sample_record(category: Category, name: &str, manufacturer: &str) -> Record {
    match category {
        Category::Cpu => Record::Cpu(Cpu::new(name, manufacturer)),
        Category::CpuCooler => Record::CpuCooler(CpuCooler::new(name, manufacturer)),
        Category::Motherboard => Record::Motherboard(Motherboard::new(name, manufacturer)),
        Category::Memory => Record::Memory(Memory::new(name, manufacturer)),
        Category::InternalHardDrive => {
            Record::InternalHardDrive(InternalHardDrive::new(name, manufacturer))
        }
        Category::VideoCard => Record::VideoCard(VideoCard::new(name, manufacturer)),
        Category::PowerSupply => Record::PowerSupply(PowerSupply::new(name, manufacturer)),
        Category::Case => Record::Case(Case::new(name, manufacturer)),
        Category::CaseFan => Record::CaseFan(CaseFan::new(name, manufacturer)),
        Category::FanController => Record::FanController(FanController::new(name, manufacturer)),
        Category::ThermalPaste => Record::ThermalPaste(ThermalPaste::new(name, manufacturer)),
        Category::OpticalDrive => Record::OpticalDrive(OpticalDrive::new(name, manufacturer)),
        Category::SoundCard => Record::SoundCard(SoundCard::new(name, manufacturer)),
        Category::WiredNetworkCard => {
            Record::WiredNetworkCard(WiredNetworkCard::new(name, manufacturer))
        }
        Category::WirelessNetworkCard => {
            Record::WirelessNetworkCard(WirelessNetworkCard::new(name, manufacturer))
        }
        Category::Monitor => Record::Monitor(Monitor::new(name, manufacturer)),
        Category::ExternalHardDrive => {
            Record::ExternalHardDrive(ExternalHardDrive::new(name, manufacturer))
        }
        Category::Headphones => Record::Headphones(Headphones::new(name, manufacturer)),
        Category::Keyboard => Record::Keyboard(Keyboard::new(name, manufacturer)),
        Category::Mouse => Record::Mouse(Mouse::new(name, manufacturer)),
        Category::Speakers => Record::Speakers(Speakers::new(name, manufacturer)),
        Category::Ups => Record::Ups(Ups::new(name, manufacturer)),
    }
}
