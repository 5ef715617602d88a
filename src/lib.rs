//! Charge log analytics for electric vehicle owners: CSV ingestion, monthly aggregation, KPIs and
//! trends, plus the SQLite-backed command line application around them.

pub mod analytics;
pub mod args;
pub mod commands;
mod config;
mod db;
mod error;
pub mod filter;
pub mod format;
pub mod ingest;
pub mod model;
mod utils;

#[cfg(test)]
mod test;

pub use config::Config;
pub use error::{Error, IngestError, Result, RowError};
