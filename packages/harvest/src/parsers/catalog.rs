//! Positional parser from captured listings to typed records.

use crate::error::{ParseError, ParseResult};
use crate::traits::parser::PartParser;
use crate::types::catalog::{Category, Region};
use crate::types::record::{
    Case, CaseFan, Cpu, CpuCooler, ExternalHardDrive, FanController, Headphones,
    InternalHardDrive, Keyboard, Memory, Monitor, Motherboard, Mouse, OpticalDrive, PowerSupply,
    Price, Record, SoundCard, Speakers, ThermalPaste, Ups, VideoCard, WiredNetworkCard,
    WirelessNetworkCard,
};
use crate::types::snapshot::{RawCategoryData, RawListing};

/// [`PartParser`] for captured storefront listings.
///
/// Spec fields are positional: each category's columns arrive in a fixed
/// order, and any column may be blank. A listing with no title cannot be
/// keyed to anything and fails the parse.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogParser;

impl CatalogParser {
    pub fn new() -> Self {
        Self
    }
}

impl PartParser for CatalogParser {
    fn parse(
        &self,
        region: Region,
        category: Category,
        data: &RawCategoryData,
    ) -> ParseResult<Vec<Record>> {
        let mut records = Vec::with_capacity(data.listings.len());
        for (index, listing) in data.listings.iter().enumerate() {
            let title = listing.title.trim();
            if title.is_empty() {
                return Err(ParseError::MalformedListing {
                    region,
                    category,
                    index,
                    reason: "empty title".to_string(),
                });
            }
            let manufacturer = resolve_manufacturer(&data.manufacturers, title);
            let price = listing.price.as_deref().and_then(parse_price);
            records.push(build_record(category, title, manufacturer, price, listing));
        }
        Ok(records)
    }
}

/// Match a title against the page's manufacturer filter list.
///
/// The longest case-insensitive prefix wins, so "Cooler Master" beats
/// "Cooler". Titles matching no filter entry fall back to their first
/// word.
fn resolve_manufacturer(manufacturers: &[String], title: &str) -> String {
    let lower = title.to_lowercase();
    let mut best: Option<&str> = None;
    for manufacturer in manufacturers {
        if lower.starts_with(&manufacturer.to_lowercase())
            && best.map_or(true, |b| manufacturer.len() > b.len())
        {
            best = Some(manufacturer);
        }
    }
    match best {
        Some(manufacturer) => manufacturer.to_string(),
        None => title
            .split_whitespace()
            .next()
            .unwrap_or(title)
            .to_string(),
    }
}

/// Read a display price like "$1,234.56" or "99,90 €" into minor units.
///
/// Cells with no digits at all ("Add", empty) are not prices. A lone
/// comma followed by exactly two digits is a decimal separator; every
/// other comma is a thousands separator.
fn parse_price(text: &str) -> Option<Price> {
    let text = text.trim();
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let amount: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    let minor_units = parse_amount(&amount)?;

    let prefix = text[..start].trim();
    let suffix = text[start + amount.len()..].trim();
    let currency = if !prefix.is_empty() {
        prefix
    } else if !suffix.is_empty() && !suffix.chars().any(|c| c.is_ascii_alphanumeric()) {
        suffix
    } else {
        ""
    };
    Some(Price::new(minor_units, currency))
}

fn parse_amount(amount: &str) -> Option<i64> {
    // When both separators appear, the later one is the decimal point
    // ("1,234.56" and "1.299,00" both work). A lone comma is decimal only
    // when exactly two digits follow it.
    let decimal_at = match (amount.rfind('.'), amount.rfind(',')) {
        (Some(dot), Some(comma)) => Some(dot.max(comma)),
        (Some(dot), None) => Some(dot),
        (None, Some(comma)) => {
            let frac = &amount[comma + 1..];
            (frac.len() == 2 && frac.chars().all(|c| c.is_ascii_digit())).then_some(comma)
        }
        (None, None) => None,
    };
    let (whole, frac) = match decimal_at {
        Some(at) => (&amount[..at], &amount[at + 1..]),
        None => (amount, ""),
    };

    let whole: String = whole.chars().filter(|c| c.is_ascii_digit()).collect();
    if whole.is_empty() {
        return None;
    }
    let whole: i64 = whole.parse().ok()?;
    let cents: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().ok()? * 10,
        _ => frac[..2].parse().ok()?,
    };
    Some(whole * 100 + cents)
}

fn field(listing: &RawListing, index: usize) -> Option<String> {
    listing
        .fields
        .get(index)
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .map(str::to_string)
}

fn numeric_field(listing: &RawListing, index: usize) -> Option<u32> {
    let text = field(listing, index)?;
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn build_record(
    category: Category,
    title: &str,
    manufacturer: String,
    price: Option<Price>,
    listing: &RawListing,
) -> Record {
    match category {
        Category::Cpu => {
            let mut r = Cpu::new(title, manufacturer);
            r.price = price;
            r.cores = numeric_field(listing, 0);
            r.base_clock = field(listing, 1);
            r.boost_clock = field(listing, 2);
            Record::Cpu(r)
        }
        Category::CpuCooler => {
            let mut r = CpuCooler::new(title, manufacturer);
            r.price = price;
            r.fan_rpm = field(listing, 0);
            r.noise_level = field(listing, 1);
            Record::CpuCooler(r)
        }
        Category::Motherboard => {
            let mut r = Motherboard::new(title, manufacturer);
            r.price = price;
            r.socket = field(listing, 0);
            r.form_factor = field(listing, 1);
            r.ram_slots = numeric_field(listing, 2);
            Record::Motherboard(r)
        }
        Category::Memory => {
            let mut r = Memory::new(title, manufacturer);
            r.price = price;
            r.speed = field(listing, 0);
            r.capacity = field(listing, 1);
            Record::Memory(r)
        }
        Category::InternalHardDrive => {
            let mut r = InternalHardDrive::new(title, manufacturer);
            r.price = price;
            r.capacity = field(listing, 0);
            r.drive_type = field(listing, 1);
            r.cache = field(listing, 2);
            Record::InternalHardDrive(r)
        }
        Category::VideoCard => {
            let mut r = VideoCard::new(title, manufacturer);
            r.price = price;
            r.chipset = field(listing, 0);
            r.memory = field(listing, 1);
            r.core_clock = field(listing, 2);
            Record::VideoCard(r)
        }
        Category::PowerSupply => {
            let mut r = PowerSupply::new(title, manufacturer);
            r.price = price;
            r.wattage = numeric_field(listing, 0);
            r.modular = field(listing, 1);
            r.efficiency = field(listing, 2);
            Record::PowerSupply(r)
        }
        Category::Case => {
            let mut r = Case::new(title, manufacturer);
            r.price = price;
            r.case_type = field(listing, 0);
            r.color = field(listing, 1);
            Record::Case(r)
        }
        Category::CaseFan => {
            let mut r = CaseFan::new(title, manufacturer);
            r.price = price;
            r.size = field(listing, 0);
            r.rpm = field(listing, 1);
            Record::CaseFan(r)
        }
        Category::FanController => {
            let mut r = FanController::new(title, manufacturer);
            r.price = price;
            r.channels = numeric_field(listing, 0);
            r.channel_wattage = field(listing, 1);
            Record::FanController(r)
        }
        Category::ThermalPaste => {
            let mut r = ThermalPaste::new(title, manufacturer);
            r.price = price;
            r.amount = field(listing, 0);
            Record::ThermalPaste(r)
        }
        Category::OpticalDrive => {
            let mut r = OpticalDrive::new(title, manufacturer);
            r.price = price;
            r.bd_speed = field(listing, 0);
            r.dvd_speed = field(listing, 1);
            r.cd_speed = field(listing, 2);
            Record::OpticalDrive(r)
        }
        Category::SoundCard => {
            let mut r = SoundCard::new(title, manufacturer);
            r.price = price;
            r.channels = field(listing, 0);
            r.sample_rate = field(listing, 1);
            Record::SoundCard(r)
        }
        Category::WiredNetworkCard => {
            let mut r = WiredNetworkCard::new(title, manufacturer);
            r.price = price;
            r.interface = field(listing, 0);
            r.speed = field(listing, 1);
            Record::WiredNetworkCard(r)
        }
        Category::WirelessNetworkCard => {
            let mut r = WirelessNetworkCard::new(title, manufacturer);
            r.price = price;
            r.interface = field(listing, 0);
            r.protocol = field(listing, 1);
            Record::WirelessNetworkCard(r)
        }
        Category::Monitor => {
            let mut r = Monitor::new(title, manufacturer);
            r.price = price;
            r.screen_size = field(listing, 0);
            r.resolution = field(listing, 1);
            r.refresh_rate = field(listing, 2);
            Record::Monitor(r)
        }
        Category::ExternalHardDrive => {
            let mut r = ExternalHardDrive::new(title, manufacturer);
            r.price = price;
            r.capacity = field(listing, 0);
            r.interface = field(listing, 1);
            Record::ExternalHardDrive(r)
        }
        Category::Headphones => {
            let mut r = Headphones::new(title, manufacturer);
            r.price = price;
            r.headphone_type = field(listing, 0);
            r.frequency_response = field(listing, 1);
            Record::Headphones(r)
        }
        Category::Keyboard => {
            let mut r = Keyboard::new(title, manufacturer);
            r.price = price;
            r.style = field(listing, 0);
            r.switch_type = field(listing, 1);
            Record::Keyboard(r)
        }
        Category::Mouse => {
            let mut r = Mouse::new(title, manufacturer);
            r.price = price;
            r.tracking = field(listing, 0);
            r.connection = field(listing, 1);
            Record::Mouse(r)
        }
        Category::Speakers => {
            let mut r = Speakers::new(title, manufacturer);
            r.price = price;
            r.configuration = field(listing, 0);
            r.total_wattage = field(listing, 1);
            Record::Speakers(r)
        }
        Category::Ups => {
            let mut r = Ups::new(title, manufacturer);
            r.price = price;
            r.capacity_va = numeric_field(listing, 0);
            r.capacity_watts = numeric_field(listing, 1);
            Record::Ups(r)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_resolve_manufacturer_longest_prefix_wins() {
        let manufacturers = owned(&["Cooler", "Cooler Master", "Corsair"]);
        assert_eq!(
            resolve_manufacturer(&manufacturers, "Cooler Master Hyper 212"),
            "Cooler Master",
        );
        assert_eq!(
            resolve_manufacturer(&manufacturers, "corsair RM750"),
            "Corsair",
        );
    }

    #[test]
    fn test_resolve_manufacturer_falls_back_to_first_word() {
        assert_eq!(
            resolve_manufacturer(&owned(&["AMD"]), "Noctua NH-D15"),
            "Noctua",
        );
    }

    #[test]
    fn test_parse_price_prefix_currency() {
        assert_eq!(parse_price("$1,234.56"), Some(Price::new(123456, "$")));
        assert_eq!(parse_price("$129.99 Add"), Some(Price::new(12999, "$")));
        assert_eq!(parse_price("€99.90"), Some(Price::new(9990, "€")));
    }

    #[test]
    fn test_parse_price_suffix_currency() {
        assert_eq!(parse_price("99,90 €"), Some(Price::new(9990, "€")));
        assert_eq!(parse_price("1.299,00 €"), Some(Price::new(129900, "€")));
        assert_eq!(parse_price("1,234"), Some(Price::new(123400, "")));
    }

    #[test]
    fn test_parse_price_rejects_non_prices() {
        assert_eq!(parse_price("Add"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn test_cpu_fields_map_positionally() {
        let data = RawCategoryData::new(
            owned(&["AMD", "Intel"]),
            vec![RawListing::new("AMD Ryzen 5 5600")
                .with_field("6")
                .with_field("3.5 GHz")
                .with_field("4.4 GHz")
                .with_price("$129.99")],
        );

        let records = CatalogParser::new()
            .parse(Region::Us, Category::Cpu, &data)
            .unwrap();
        let Record::Cpu(cpu) = &records[0] else {
            panic!("expected a cpu record");
        };
        assert_eq!(cpu.name, "AMD Ryzen 5 5600");
        assert_eq!(cpu.manufacturer, "AMD");
        assert_eq!(cpu.cores, Some(6));
        assert_eq!(cpu.base_clock.as_deref(), Some("3.5 GHz"));
        assert_eq!(cpu.boost_clock.as_deref(), Some("4.4 GHz"));
        assert_eq!(cpu.price, Some(Price::new(12999, "$")));
    }

    #[test]
    fn test_blank_fields_become_none() {
        let data = RawCategoryData::new(
            owned(&["EVGA"]),
            vec![RawListing::new("EVGA 650 BQ")
                .with_field("650 W")
                .with_field("")
                .with_field("80+ Bronze")],
        );

        let records = CatalogParser::new()
            .parse(Region::De, Category::PowerSupply, &data)
            .unwrap();
        let Record::PowerSupply(psu) = &records[0] else {
            panic!("expected a power supply record");
        };
        assert_eq!(psu.wattage, Some(650));
        assert_eq!(psu.modular, None);
        assert_eq!(psu.efficiency.as_deref(), Some("80+ Bronze"));
        assert_eq!(psu.price, None);
    }

    #[test]
    fn test_empty_title_is_malformed() {
        let data = RawCategoryData::new(
            Vec::new(),
            vec![RawListing::new("Fine"), RawListing::new("   ")],
        );

        let result = CatalogParser::new().parse(Region::Fr, Category::Mouse, &data);
        assert!(matches!(
            result,
            Err(ParseError::MalformedListing { index: 1, .. })
        ));
    }
}

#[cfg(test)]
mod props {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        // Whatever the parser accepts must survive the plain-data codec
        // unchanged, or the publish stage would reject its own input.
        #[test]
        fn test_parsed_records_survive_plain_codec(
            cat_idx in 0usize..Category::ALL.len(),
            title in "[A-Za-z][A-Za-z0-9 ]{0,39}",
            fields in prop::collection::vec("[A-Za-z0-9 .]{0,12}", 0..6),
            price in prop::option::of("[0-9]{1,6}(\\.[0-9]{2})?"),
        ) {
            let category = Category::ALL[cat_idx];
            let mut listing = RawListing::new(title);
            listing.fields = fields;
            listing.price = price;
            let data = RawCategoryData::new(vec!["Acme".to_string()], vec![listing]);

            let records = CatalogParser::new()
                .parse(Region::Us, category, &data)
                .unwrap();
            prop_assert_eq!(records.len(), 1);

            let plain = records[0].to_plain().unwrap();
            let decoded = Record::from_plain(category, &plain).unwrap();
            prop_assert_eq!(decoded, records[0].clone());
        }
    }
}
