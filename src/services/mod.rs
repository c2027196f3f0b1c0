// src/services/mod.rs

//! Scraping services: listing discovery, table parsing, reconciliation.

pub mod discovery;
pub mod parser;
pub mod reconcile;

pub use discovery::ProgramDiscoverer;
pub use reconcile::{ReconcileOutcome, Reconciler};
