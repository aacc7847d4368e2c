//! Random-sampling portfolio search library
//!
//! This crate provides two complementary engines over historical daily
//! returns:
//! - Iterative search over random equal-weighted asset subsets, scored
//!   against a benchmark and stopped at a target cumulative return or an
//!   iteration budget
//! - Monte Carlo sweep of random weight vectors over a fixed universe,
//!   tracing the risk/return cloud and picking the maximum-Sharpe allocation
//!
//! Supporting pieces convert closing prices into daily returns, compute
//! return/risk statistics, summarize return distributions, and generate
//! synthetic markets.
//!
//! ```ignore
//! use folioscan_core::{ReturnSeriesBuilder, RunControl};
//! use folioscan_core::frontier::{FrontierConfig, FrontierInputs, FrontierSimulator};
//!
//! let returns = ReturnSeriesBuilder::new().build(&prices)?;
//! let inputs = FrontierInputs::from_returns(&returns)?;
//! let simulator = FrontierSimulator::new(inputs, FrontierConfig::default())?;
//! let report = simulator.run_parallel(42, &RunControl::default())?;
//! println!("optimal: {:?}", report.optimal);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod control;
pub mod distribution;
pub mod error;
pub mod frontier;
pub mod returns;
pub mod sampling;
pub mod search;
pub mod statistics;
pub mod synthetic;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use control::RunControl;
pub use error::{DataError, EngineError, SamplingError, StatsError};
pub use returns::ReturnSeriesBuilder;
