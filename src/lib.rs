// src/lib.rs

//! University timetable scraper library.
//!
//! Crawls the paginated program listing of a faculty timetable site,
//! parses each program's schedule table into normalized lecture records
//! and reconciles them into the relational lecture store.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod store;
pub mod utils;
