// src/pipeline/mod.rs

//! Pipeline entry points for scraper operations.

pub mod scrape;

pub use scrape::{ScrapeSummary, run_scraper};
