//! Subset search configuration

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, SamplingError};
use crate::model::AssetUniverse;
use crate::statistics::TRADING_DAYS_PER_YEAR;

/// Parameters of the iterative equal-weight subset search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Assets per candidate portfolio (k)
    pub subset_size: usize,

    /// Candidate portfolios generated per iteration
    pub batch_size: usize,

    /// Cumulative growth factor the winner must reach (1.12 = +12%)
    pub target_cumulative_return: f64,

    /// Iterations before giving up
    pub max_iterations: usize,

    /// Used when annualizing the winner's statistics
    pub trading_days_per_year: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            subset_size: 4,
            batch_size: 100,
            target_cumulative_return: 1.12,
            max_iterations: 10_000,
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

impl SearchConfig {
    /// Reject structural misconfiguration before any iteration starts
    pub fn validate(&self, universe: &AssetUniverse) -> Result<(), EngineError> {
        if universe.is_empty() {
            return Err(SamplingError::EmptyUniverse.into());
        }
        if self.subset_size == 0 {
            return Err(EngineError::Config("subset size must be at least 1".to_string()));
        }
        if self.subset_size > universe.len() {
            return Err(SamplingError::InsufficientUniverse {
                requested: self.subset_size,
                available: universe.len(),
            }
            .into());
        }
        if self.batch_size == 0 {
            return Err(EngineError::Config("batch size must be at least 1".to_string()));
        }
        if self.max_iterations == 0 {
            return Err(EngineError::Config(
                "max iterations must be at least 1".to_string(),
            ));
        }
        if !self.target_cumulative_return.is_finite() {
            return Err(EngineError::Config(format!(
                "target cumulative return must be finite, got {}",
                self.target_cumulative_return
            )));
        }
        Ok(())
    }
}
