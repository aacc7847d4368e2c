use serde::{Deserialize, Serialize};

use super::{AssetId, AssetUniverse, ReturnSeries};

/// A fixed-size subset of the universe held in equal weights.
///
/// Carries the aggregate daily series (mean across the members' returns).
#[derive(Debug, Clone, PartialEq)]
pub struct EqualWeightPortfolio {
    assets: Vec<AssetId>,
    returns: ReturnSeries,
}

impl EqualWeightPortfolio {
    #[must_use]
    pub fn new(assets: Vec<AssetId>, returns: ReturnSeries) -> Self {
        Self { assets, returns }
    }

    #[must_use]
    pub fn assets(&self) -> &[AssetId] {
        &self.assets
    }

    #[must_use]
    pub fn returns(&self) -> &ReturnSeries {
        &self.returns
    }

    #[must_use]
    pub fn tickers(&self, universe: &AssetUniverse) -> Vec<String> {
        universe.tickers_for(&self.assets)
    }
}

/// One Monte Carlo trial: a weight vector over the whole universe and the
/// statistics it implies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedPortfolio {
    /// Zero-based index of the trial that produced this portfolio
    pub trial: usize,
    pub weights: Vec<f64>,
    pub expected_return: f64,
    pub risk: f64,
    pub sharpe: f64,
}
