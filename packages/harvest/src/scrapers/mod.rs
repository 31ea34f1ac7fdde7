//! Scrape collaborator implementations.

pub mod webdriver;

pub use webdriver::WebDriverScraper;
