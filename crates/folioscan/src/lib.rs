//! Command-line front-end for the folioscan portfolio search engines
//!
//! This crate wires the core engines to the outside world:
//! - YAML run configuration
//! - Closing prices from CSV files or a synthetic market
//! - Console prompt for the search target
//! - Text and JSON reports, plus a CSV export of the frontier cloud
//! - Logging to stderr or a size-rotated file

pub mod commands;
pub mod config;
pub mod data;
pub mod logging;
pub mod prompt;
pub mod report;

pub use config::RunConfig;
pub use data::{CsvPriceSource, PriceSource, SyntheticPriceSource};
pub use logging::init_logging;
pub use report::OutputFormat;
