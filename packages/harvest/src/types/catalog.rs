//! The fixed category and region sets that define the scrape matrix.
//!
//! Both sets are closed enums so that an unsupported identifier is a
//! construction-time error rather than a runtime lookup miss. The serde
//! names double as store keys and artifact file names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::IdentError;

/// A hardware product class with its own listing page and record schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Cpu,
    CpuCooler,
    Motherboard,
    Memory,
    InternalHardDrive,
    VideoCard,
    PowerSupply,
    Case,
    CaseFan,
    FanController,
    ThermalPaste,
    OpticalDrive,
    SoundCard,
    WiredNetworkCard,
    WirelessNetworkCard,
    Monitor,
    ExternalHardDrive,
    Headphones,
    Keyboard,
    Mouse,
    Speakers,
    Ups,
}

impl Category {
    /// Every supported category.
    pub const ALL: [Category; 22] = [
        Category::Cpu,
        Category::CpuCooler,
        Category::Motherboard,
        Category::Memory,
        Category::InternalHardDrive,
        Category::VideoCard,
        Category::PowerSupply,
        Category::Case,
        Category::CaseFan,
        Category::FanController,
        Category::ThermalPaste,
        Category::OpticalDrive,
        Category::SoundCard,
        Category::WiredNetworkCard,
        Category::WirelessNetworkCard,
        Category::Monitor,
        Category::ExternalHardDrive,
        Category::Headphones,
        Category::Keyboard,
        Category::Mouse,
        Category::Speakers,
        Category::Ups,
    ];

    /// The category identifier used in URLs, store keys, and file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Cpu => "cpu",
            Category::CpuCooler => "cpu-cooler",
            Category::Motherboard => "motherboard",
            Category::Memory => "memory",
            Category::InternalHardDrive => "internal-hard-drive",
            Category::VideoCard => "video-card",
            Category::PowerSupply => "power-supply",
            Category::Case => "case",
            Category::CaseFan => "case-fan",
            Category::FanController => "fan-controller",
            Category::ThermalPaste => "thermal-paste",
            Category::OpticalDrive => "optical-drive",
            Category::SoundCard => "sound-card",
            Category::WiredNetworkCard => "wired-network-card",
            Category::WirelessNetworkCard => "wireless-network-card",
            Category::Monitor => "monitor",
            Category::ExternalHardDrive => "external-hard-drive",
            Category::Headphones => "headphones",
            Category::Keyboard => "keyboard",
            Category::Mouse => "mouse",
            Category::Speakers => "speakers",
            Category::Ups => "ups",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = IdentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| IdentError::UnknownCategory(s.to_string()))
    }
}

/// A regional storefront identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Au,
    Be,
    Ca,
    De,
    Es,
    Fr,
    Ie,
    In,
    It,
    Nz,
    Se,
    Uk,
    Us,
}

impl Region {
    /// Every supported region.
    pub const ALL: [Region; 13] = [
        Region::Au,
        Region::Be,
        Region::Ca,
        Region::De,
        Region::Es,
        Region::Fr,
        Region::Ie,
        Region::In,
        Region::It,
        Region::Nz,
        Region::Se,
        Region::Uk,
        Region::Us,
    ];

    /// The region identifier used in storefront subdomains and store keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Au => "au",
            Region::Be => "be",
            Region::Ca => "ca",
            Region::De => "de",
            Region::Es => "es",
            Region::Fr => "fr",
            Region::Ie => "ie",
            Region::In => "in",
            Region::It => "it",
            Region::Nz => "nz",
            Region::Se => "se",
            Region::Uk => "uk",
            Region::Us => "us",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = IdentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .iter()
            .find(|r| r.as_str() == s)
            .copied()
            .ok_or_else(|| IdentError::UnknownRegion(s.to_string()))
    }
}

/// One unit of scrape work: a single (category, region) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkItem {
    pub category: Category,
    pub region: Region,
}

impl WorkItem {
    /// Create a new work item.
    pub fn new(category: Category, region: Region) -> Self {
        Self { category, region }
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.region, self.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_names_match_as_str() {
        for category in Category::ALL {
            let value = serde_json::to_value(category).unwrap();
            assert_eq!(value.as_str(), Some(category.as_str()));
        }
        for region in Region::ALL {
            let value = serde_json::to_value(region).unwrap();
            assert_eq!(value.as_str(), Some(region.as_str()));
        }
    }

    #[test]
    fn test_from_str_round_trip() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        for region in Region::ALL {
            assert_eq!(region.as_str().parse::<Region>().unwrap(), region);
        }
        assert!("floppy-drive".parse::<Category>().is_err());
        assert!("zz".parse::<Region>().is_err());
    }

    #[test]
    fn test_matrix_size() {
        assert_eq!(Category::ALL.len(), 22);
        assert_eq!(Region::ALL.len(), 13);
    }

    #[test]
    fn test_work_item_display() {
        let item = WorkItem::new(Category::CpuCooler, Region::Uk);
        assert_eq!(item.to_string(), "uk/cpu-cooler");
    }
}
