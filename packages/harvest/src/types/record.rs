//! Normalized record schemas, one per supported category.
//!
//! [`Record`] is a closed enum: adding a category means adding a variant
//! here and an arm to the codec, so there is no string-keyed schema lookup
//! that can miss at runtime. Within a snapshot the tag is carried inline
//! (`"category": "cpu"`); the plain-data form used by the publish stage is
//! the bare field object with the tag erased.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::catalog::Category;

/// A listed price in the storefront's own currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in minor currency units (cents, pence).
    pub minor_units: i64,

    /// Currency marker as displayed by the storefront ("$", "€", ...).
    pub currency: String,
}

impl Price {
    /// Create a new price.
    pub fn new(minor_units: i64, currency: impl Into<String>) -> Self {
        Self {
            minor_units,
            currency: currency.into(),
        }
    }
}

/// A processor listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cpu {
    /// Full part name as listed.
    pub name: String,

    /// Manufacturer resolved against the region's filter list.
    pub manufacturer: String,

    pub price: Option<Price>,
    pub cores: Option<u32>,
    pub base_clock: Option<String>,
    pub boost_clock: Option<String>,
}

impl Cpu {
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            price: None,
            cores: None,
            base_clock: None,
            boost_clock: None,
        }
    }
}

/// A CPU cooler listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuCooler {
    pub name: String,
    pub manufacturer: String,
    pub price: Option<Price>,
    pub fan_rpm: Option<String>,
    pub noise_level: Option<String>,
}

impl CpuCooler {
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            price: None,
            fan_rpm: None,
            noise_level: None,
        }
    }
}

/// A motherboard listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Motherboard {
    pub name: String,
    pub manufacturer: String,
    pub price: Option<Price>,
    pub socket: Option<String>,
    pub form_factor: Option<String>,
    pub ram_slots: Option<u32>,
}

impl Motherboard {
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            price: None,
            socket: None,
            form_factor: None,
            ram_slots: None,
        }
    }
}

/// A memory kit listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub name: String,
    pub manufacturer: String,
    pub price: Option<Price>,
    pub speed: Option<String>,
    pub capacity: Option<String>,
}

impl Memory {
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            price: None,
            speed: None,
            capacity: None,
        }
    }
}

/// An internal drive listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalHardDrive {
    pub name: String,
    pub manufacturer: String,
    pub price: Option<Price>,
    pub capacity: Option<String>,
    pub drive_type: Option<String>,
    pub cache: Option<String>,
}

impl InternalHardDrive {
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            price: None,
            capacity: None,
            drive_type: None,
            cache: None,
        }
    }
}

/// A graphics card listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoCard {
    pub name: String,
    pub manufacturer: String,
    pub price: Option<Price>,
    pub chipset: Option<String>,
    pub memory: Option<String>,
    pub core_clock: Option<String>,
}

impl VideoCard {
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            price: None,
            chipset: None,
            memory: None,
            core_clock: None,
        }
    }
}

/// A power supply listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerSupply {
    pub name: String,
    pub manufacturer: String,
    pub price: Option<Price>,
    pub wattage: Option<u32>,
    pub modular: Option<String>,
    pub efficiency: Option<String>,
}

impl PowerSupply {
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            price: None,
            wattage: None,
            modular: None,
            efficiency: None,
        }
    }
}

/// A case listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub name: String,
    pub manufacturer: String,
    pub price: Option<Price>,
    pub case_type: Option<String>,
    pub color: Option<String>,
}

impl Case {
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            price: None,
            case_type: None,
            color: None,
        }
    }
}

/// A case fan listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseFan {
    pub name: String,
    pub manufacturer: String,
    pub price: Option<Price>,
    pub size: Option<String>,
    pub rpm: Option<String>,
}

impl CaseFan {
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            price: None,
            size: None,
            rpm: None,
        }
    }
}

/// A fan controller listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanController {
    pub name: String,
    pub manufacturer: String,
    pub price: Option<Price>,
    pub channels: Option<u32>,
    pub channel_wattage: Option<String>,
}

impl FanController {
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            price: None,
            channels: None,
            channel_wattage: None,
        }
    }
}

/// A thermal paste listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalPaste {
    pub name: String,
    pub manufacturer: String,
    pub price: Option<Price>,
    pub amount: Option<String>,
}

impl ThermalPaste {
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            price: None,
            amount: None,
        }
    }
}

/// An optical drive listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpticalDrive {
    pub name: String,
    pub manufacturer: String,
    pub price: Option<Price>,
    pub bd_speed: Option<String>,
    pub dvd_speed: Option<String>,
    pub cd_speed: Option<String>,
}

impl OpticalDrive {
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            price: None,
            bd_speed: None,
            dvd_speed: None,
            cd_speed: None,
        }
    }
}

/// A sound card listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundCard {
    pub name: String,
    pub manufacturer: String,
    pub price: Option<Price>,
    pub channels: Option<String>,
    pub sample_rate: Option<String>,
}

impl SoundCard {
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            price: None,
            channels: None,
            sample_rate: None,
        }
    }
}

/// A wired network adapter listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WiredNetworkCard {
    pub name: String,
    pub manufacturer: String,
    pub price: Option<Price>,
    pub interface: Option<String>,
    pub speed: Option<String>,
}

impl WiredNetworkCard {
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            price: None,
            interface: None,
            speed: None,
        }
    }
}

/// A wireless network adapter listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WirelessNetworkCard {
    pub name: String,
    pub manufacturer: String,
    pub price: Option<Price>,
    pub interface: Option<String>,
    pub protocol: Option<String>,
}

impl WirelessNetworkCard {
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            price: None,
            interface: None,
            protocol: None,
        }
    }
}

/// A monitor listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monitor {
    pub name: String,
    pub manufacturer: String,
    pub price: Option<Price>,
    pub screen_size: Option<String>,
    pub resolution: Option<String>,
    pub refresh_rate: Option<String>,
}

impl Monitor {
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            price: None,
            screen_size: None,
            resolution: None,
            refresh_rate: None,
        }
    }
}

/// An external drive listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalHardDrive {
    pub name: String,
    pub manufacturer: String,
    pub price: Option<Price>,
    pub capacity: Option<String>,
    pub interface: Option<String>,
}

impl ExternalHardDrive {
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            price: None,
            capacity: None,
            interface: None,
        }
    }
}

/// A headphone listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Headphones {
    pub name: String,
    pub manufacturer: String,
    pub price: Option<Price>,
    pub headphone_type: Option<String>,
    pub frequency_response: Option<String>,
}

impl Headphones {
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            price: None,
            headphone_type: None,
            frequency_response: None,
        }
    }
}

/// A keyboard listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyboard {
    pub name: String,
    pub manufacturer: String,
    pub price: Option<Price>,
    pub style: Option<String>,
    pub switch_type: Option<String>,
}

impl Keyboard {
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            price: None,
            style: None,
            switch_type: None,
        }
    }
}

/// A mouse listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mouse {
    pub name: String,
    pub manufacturer: String,
    pub price: Option<Price>,
    pub tracking: Option<String>,
    pub connection: Option<String>,
}

impl Mouse {
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            price: None,
            tracking: None,
            connection: None,
        }
    }
}

/// A speaker listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Speakers {
    pub name: String,
    pub manufacturer: String,
    pub price: Option<Price>,
    pub configuration: Option<String>,
    pub total_wattage: Option<String>,
}

impl Speakers {
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            price: None,
            configuration: None,
            total_wattage: None,
        }
    }
}

/// An uninterruptible power supply listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ups {
    pub name: String,
    pub manufacturer: String,
    pub price: Option<Price>,
    pub capacity_va: Option<u32>,
    pub capacity_watts: Option<u32>,
}

impl Ups {
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            price: None,
            capacity_va: None,
            capacity_watts: None,
        }
    }
}

/// A normalized record, tagged by category.
///
/// The serde tag values match [`Category::as_str`], so a serialized record
/// carries the same category identifier used for store keys and file names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "kebab-case")]
pub enum Record {
    Cpu(Cpu),
    CpuCooler(CpuCooler),
    Motherboard(Motherboard),
    Memory(Memory),
    InternalHardDrive(InternalHardDrive),
    VideoCard(VideoCard),
    PowerSupply(PowerSupply),
    Case(Case),
    CaseFan(CaseFan),
    FanController(FanController),
    ThermalPaste(ThermalPaste),
    OpticalDrive(OpticalDrive),
    SoundCard(SoundCard),
    WiredNetworkCard(WiredNetworkCard),
    WirelessNetworkCard(WirelessNetworkCard),
    Monitor(Monitor),
    ExternalHardDrive(ExternalHardDrive),
    Headphones(Headphones),
    Keyboard(Keyboard),
    Mouse(Mouse),
    Speakers(Speakers),
    Ups(Ups),
}

impl Record {
    /// The category this record belongs to.
    pub fn category(&self) -> Category {
        match self {
            Record::Cpu(_) => Category::Cpu,
            Record::CpuCooler(_) => Category::CpuCooler,
            Record::Motherboard(_) => Category::Motherboard,
            Record::Memory(_) => Category::Memory,
            Record::InternalHardDrive(_) => Category::InternalHardDrive,
            Record::VideoCard(_) => Category::VideoCard,
            Record::PowerSupply(_) => Category::PowerSupply,
            Record::Case(_) => Category::Case,
            Record::CaseFan(_) => Category::CaseFan,
            Record::FanController(_) => Category::FanController,
            Record::ThermalPaste(_) => Category::ThermalPaste,
            Record::OpticalDrive(_) => Category::OpticalDrive,
            Record::SoundCard(_) => Category::SoundCard,
            Record::WiredNetworkCard(_) => Category::WiredNetworkCard,
            Record::WirelessNetworkCard(_) => Category::WirelessNetworkCard,
            Record::Monitor(_) => Category::Monitor,
            Record::ExternalHardDrive(_) => Category::ExternalHardDrive,
            Record::Headphones(_) => Category::Headphones,
            Record::Keyboard(_) => Category::Keyboard,
            Record::Mouse(_) => Category::Mouse,
            Record::Speakers(_) => Category::Speakers,
            Record::Ups(_) => Category::Ups,
        }
    }

    /// Reduce this record to its schema-erased plain-data form.
    ///
    /// The result is the bare field object with no category tag; pairing it
    /// back with a [`Category`] is what [`Record::from_plain`] is for.
    pub fn to_plain(&self) -> serde_json::Result<Value> {
        match self {
            Record::Cpu(r) => serde_json::to_value(r),
            Record::CpuCooler(r) => serde_json::to_value(r),
            Record::Motherboard(r) => serde_json::to_value(r),
            Record::Memory(r) => serde_json::to_value(r),
            Record::InternalHardDrive(r) => serde_json::to_value(r),
            Record::VideoCard(r) => serde_json::to_value(r),
            Record::PowerSupply(r) => serde_json::to_value(r),
            Record::Case(r) => serde_json::to_value(r),
            Record::CaseFan(r) => serde_json::to_value(r),
            Record::FanController(r) => serde_json::to_value(r),
            Record::ThermalPaste(r) => serde_json::to_value(r),
            Record::OpticalDrive(r) => serde_json::to_value(r),
            Record::SoundCard(r) => serde_json::to_value(r),
            Record::WiredNetworkCard(r) => serde_json::to_value(r),
            Record::WirelessNetworkCard(r) => serde_json::to_value(r),
            Record::Monitor(r) => serde_json::to_value(r),
            Record::ExternalHardDrive(r) => serde_json::to_value(r),
            Record::Headphones(r) => serde_json::to_value(r),
            Record::Keyboard(r) => serde_json::to_value(r),
            Record::Mouse(r) => serde_json::to_value(r),
            Record::Speakers(r) => serde_json::to_value(r),
            Record::Ups(r) => serde_json::to_value(r),
        }
    }

    /// Decode a plain-data object back into the record variant for `category`.
    pub fn from_plain(category: Category, value: &Value) -> serde_json::Result<Record> {
        let value = value.clone();
        let record = match category {
            Category::Cpu => Record::Cpu(serde_json::from_value(value)?),
            Category::CpuCooler => Record::CpuCooler(serde_json::from_value(value)?),
            Category::Motherboard => Record::Motherboard(serde_json::from_value(value)?),
            Category::Memory => Record::Memory(serde_json::from_value(value)?),
            Category::InternalHardDrive => Record::InternalHardDrive(serde_json::from_value(value)?),
            Category::VideoCard => Record::VideoCard(serde_json::from_value(value)?),
            Category::PowerSupply => Record::PowerSupply(serde_json::from_value(value)?),
            Category::Case => Record::Case(serde_json::from_value(value)?),
            Category::CaseFan => Record::CaseFan(serde_json::from_value(value)?),
            Category::FanController => Record::FanController(serde_json::from_value(value)?),
            Category::ThermalPaste => Record::ThermalPaste(serde_json::from_value(value)?),
            Category::OpticalDrive => Record::OpticalDrive(serde_json::from_value(value)?),
            Category::SoundCard => Record::SoundCard(serde_json::from_value(value)?),
            Category::WiredNetworkCard => Record::WiredNetworkCard(serde_json::from_value(value)?),
            Category::WirelessNetworkCard => {
                Record::WirelessNetworkCard(serde_json::from_value(value)?)
            }
            Category::Monitor => Record::Monitor(serde_json::from_value(value)?),
            Category::ExternalHardDrive => Record::ExternalHardDrive(serde_json::from_value(value)?),
            Category::Headphones => Record::Headphones(serde_json::from_value(value)?),
            Category::Keyboard => Record::Keyboard(serde_json::from_value(value)?),
            Category::Mouse => Record::Mouse(serde_json::from_value(value)?),
            Category::Speakers => Record::Speakers(serde_json::from_value(value)?),
            Category::Ups => Record::Ups(serde_json::from_value(value)?),
        };
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_record;

    #[test]
    fn test_tag_matches_category_name() {
        for category in Category::ALL {
            let record = sample_record(category, "Part", "Maker");
            let value = serde_json::to_value(&record).unwrap();
            assert_eq!(
                value.get("category").and_then(Value::as_str),
                Some(category.as_str()),
            );
            assert_eq!(record.category(), category);
        }
    }

    #[test]
    fn test_plain_form_is_untagged() {
        let record = sample_record(Category::Memory, "Vengeance 16GB", "Corsair");
        let plain = record.to_plain().unwrap();
        let object = plain.as_object().unwrap();
        assert!(!object.contains_key("category"));
        assert_eq!(object.get("name").and_then(Value::as_str), Some("Vengeance 16GB"));
    }

    #[test]
    fn test_plain_round_trip_with_all_fields() {
        let mut cpu = Cpu::new("Ryzen 7 5800X", "AMD");
        cpu.price = Some(Price::new(29999, "$"));
        cpu.cores = Some(8);
        cpu.base_clock = Some("3.8 GHz".to_string());
        cpu.boost_clock = Some("4.7 GHz".to_string());
        let record = Record::Cpu(cpu);

        let plain = record.to_plain().unwrap();
        let decoded = Record::from_plain(Category::Cpu, &plain).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_from_plain_rejects_malformed_entry() {
        let bogus = serde_json::json!({ "cores": 8 });
        assert!(Record::from_plain(Category::Cpu, &bogus).is_err());
    }

    #[test]
    fn test_tagged_list_round_trip() {
        let records = vec![
            sample_record(Category::Cpu, "Core i5-12400F", "Intel"),
            sample_record(Category::Ups, "Back-UPS 600", "APC"),
        ];
        let value = serde_json::to_value(&records).unwrap();
        let decoded: Vec<Record> = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, records);
    }
}
