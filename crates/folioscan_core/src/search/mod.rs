//! Iterative search over random equal-weighted asset subsets.
//!
//! # Example
//!
//! ```ignore
//! use folioscan_core::search::{SearchConfig, SubsetSearchEngine};
//! use folioscan_core::RunControl;
//!
//! let config = SearchConfig {
//!     subset_size: 4,
//!     target_cumulative_return: 1.12,
//!     ..Default::default()
//! };
//! let engine = SubsetSearchEngine::new(&returns, &benchmark, config)?;
//! let report = engine.run(&mut rand::rng(), &RunControl::default())?;
//! if report.is_converged() {
//!     println!("winner: {:?}", report.assets);
//! }
//! ```

mod config;
mod engine;
mod result;

pub use config::SearchConfig;
pub use engine::{
    BatchOutcome, ProgressCallback, ScoredCandidate, SearchRun, SearchState, SubsetSearchEngine,
};
pub use result::{
    CandidateSummary, ConvergenceHistory, IterationRecord, SearchReport, SearchStatus,
};
