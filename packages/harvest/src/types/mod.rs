//! Core domain types for the harvest pipeline.

pub mod catalog;
pub mod record;
pub mod snapshot;

pub use catalog::{Category, Region, WorkItem};
pub use record::{
    Case, CaseFan, Cpu, CpuCooler, ExternalHardDrive, FanController, Headphones,
    InternalHardDrive, Keyboard, Memory, Monitor, Motherboard, Mouse, OpticalDrive, PowerSupply,
    Price, Record, SoundCard, Speakers, ThermalPaste, Ups, VideoCard, WiredNetworkCard,
    WirelessNetworkCard,
};
pub use snapshot::{
    CategoryMap, ParsedSnapshot, PlainSnapshot, RawCategoryData, RawListing, SNAPSHOT_KEY,
};
