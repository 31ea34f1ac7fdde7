//! Parse collaborator implementations.

pub mod catalog;

pub use catalog::CatalogParser;
