//! Random subset and weight sampling.
//!
//! All randomness flows through a caller-supplied `Rng`, so production code
//! can pass an entropy-seeded generator while tests pass a seeded `StdRng`.

use rand::Rng;

use crate::error::{EngineError, SamplingError};
use crate::model::{AssetId, AssetUniverse, EqualWeightPortfolio, ReturnMatrix};

/// Draw `k` distinct assets uniformly without replacement.
///
/// The ids come back in draw order.
pub fn sample_subset<R: Rng + ?Sized>(
    rng: &mut R,
    universe: &AssetUniverse,
    k: usize,
) -> Result<Vec<AssetId>, SamplingError> {
    if universe.is_empty() {
        return Err(SamplingError::EmptyUniverse);
    }
    if k > universe.len() {
        return Err(SamplingError::InsufficientUniverse {
            requested: k,
            available: universe.len(),
        });
    }

    Ok(rand::seq::index::sample(rng, universe.len(), k)
        .into_iter()
        .map(|idx| AssetId(idx as u32))
        .collect())
}

/// Draw a random subset and aggregate it into an equal-weighted portfolio
pub fn sample_portfolio<R: Rng + ?Sized>(
    rng: &mut R,
    returns: &ReturnMatrix,
    k: usize,
) -> Result<EqualWeightPortfolio, SamplingError> {
    let assets = sample_subset(rng, returns.universe(), k)?;
    let series = returns.equal_weight_average(&assets)?;
    Ok(EqualWeightPortfolio::new(assets, series))
}

/// Draw a non-negative weight vector that sums to 1.
///
/// Each weight starts as an independent uniform draw on `[0, 1)`; the vector
/// is divided by its sum. An all-zero draw is resampled.
pub fn sample_weights<R: Rng + ?Sized>(
    rng: &mut R,
    num_assets: usize,
) -> Result<Vec<f64>, SamplingError> {
    if num_assets == 0 {
        return Err(SamplingError::EmptyUniverse);
    }

    loop {
        let raw: Vec<f64> = (0..num_assets).map(|_| rng.random::<f64>()).collect();
        let total: f64 = raw.iter().sum();
        if total > 0.0 {
            return Ok(raw.into_iter().map(|w| w / total).collect());
        }
    }
}

/// Supplies weight vectors to the frontier simulator
pub trait WeightSource {
    fn next_weights(&mut self, num_assets: usize) -> Result<Vec<f64>, EngineError>;
}

/// `WeightSource` backed by a random generator
#[derive(Debug, Clone)]
pub struct WeightSampler<R> {
    rng: R,
}

impl<R: Rng> WeightSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<R: Rng> WeightSource for WeightSampler<R> {
    fn next_weights(&mut self, num_assets: usize) -> Result<Vec<f64>, EngineError> {
        Ok(sample_weights(&mut self.rng, num_assets)?)
    }
}
