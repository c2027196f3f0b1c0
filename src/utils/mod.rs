// src/utils/mod.rs

//! Utility functions and helpers.

pub mod http;
pub mod pacing;

pub use http::{HttpFetcher, PageFetcher};
pub use pacing::{IntervalPacer, NoopPacer, Pacer};
