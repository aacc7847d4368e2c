//! Monte Carlo sweep of random weight vectors over a fixed universe.
//!
//! Every trial draws a weight vector, computes its expected return, risk,
//! and Sharpe ratio from the universe's mean-return vector and covariance
//! matrix, and appends the point to a `SimulationResult`. The point with the
//! highest Sharpe ratio (earliest trial on ties) is reported as optimal.

use serde::{Deserialize, Serialize};

use crate::control::RunControl;
use crate::error::{EngineError, StatsError};
use crate::model::{
    AssetUniverse, ReturnMatrix, SimulationResult, TerminationReason, WeightedPortfolio,
};
use crate::sampling::WeightSource;
use crate::statistics::{
    AnnualizedStats, TRADING_DAYS_PER_YEAR, annualize, covariance_matrix, mean_vector,
    portfolio_return, portfolio_risk, sharpe_ratio,
};

/// Trials evaluated per parallel work unit
#[cfg(feature = "parallel")]
const CHUNK_SIZE: usize = 100;

/// Universe statistics the sweep draws on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontierInputs {
    universe: AssetUniverse,
    mean_returns: Vec<f64>,
    covariance: Vec<Vec<f64>>,
}

impl FrontierInputs {
    pub fn new(
        universe: AssetUniverse,
        mean_returns: Vec<f64>,
        covariance: Vec<Vec<f64>>,
    ) -> Result<Self, EngineError> {
        let n = universe.len();
        if mean_returns.len() != n {
            return Err(StatsError::DimensionMismatch {
                expected: n,
                actual: mean_returns.len(),
            }
            .into());
        }
        if covariance.len() != n {
            return Err(StatsError::DimensionMismatch {
                expected: n,
                actual: covariance.len(),
            }
            .into());
        }
        if let Some(row) = covariance.iter().find(|row| row.len() != n) {
            return Err(StatsError::DimensionMismatch {
                expected: n,
                actual: row.len(),
            }
            .into());
        }

        Ok(Self {
            universe,
            mean_returns,
            covariance,
        })
    }

    /// Mean vector and sample covariance of a return matrix
    pub fn from_returns(returns: &ReturnMatrix) -> Result<Self, EngineError> {
        Self::new(
            returns.universe().clone(),
            mean_vector(returns)?,
            covariance_matrix(returns)?,
        )
    }

    #[must_use]
    pub fn universe(&self) -> &AssetUniverse {
        &self.universe
    }

    #[must_use]
    pub fn mean_returns(&self) -> &[f64] {
        &self.mean_returns
    }

    #[must_use]
    pub fn covariance(&self) -> &[Vec<f64>] {
        &self.covariance
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontierConfig {
    /// Number of weight vectors to sample
    pub trials: usize,

    /// Used when annualizing the optimal point
    pub trading_days_per_year: u32,
}

impl Default for FrontierConfig {
    fn default() -> Self {
        Self {
            trials: 10_000,
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

/// Outcome of a frontier sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontierReport {
    pub tickers: Vec<String>,

    /// Every scored trial, in trial order
    pub simulation: SimulationResult,

    /// Maximum-Sharpe point
    pub optimal: Option<WeightedPortfolio>,

    /// Optimal return and risk scaled to a year
    pub optimal_annualized: Option<AnnualizedStats>,

    pub trials_requested: usize,
    pub trials_evaluated: usize,

    /// Trials with zero risk, for which the Sharpe ratio is undefined
    pub skipped_trials: usize,

    pub termination: TerminationReason,
}

impl FrontierReport {
    /// True when the run stopped before evaluating every trial
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.termination != TerminationReason::Completed
    }
}

/// Drives the Monte Carlo weight sweep
#[derive(Debug, Clone)]
pub struct FrontierSimulator {
    inputs: FrontierInputs,
    config: FrontierConfig,
}

impl FrontierSimulator {
    pub fn new(inputs: FrontierInputs, config: FrontierConfig) -> Result<Self, EngineError> {
        if inputs.universe.is_empty() {
            return Err(crate::error::SamplingError::EmptyUniverse.into());
        }
        if config.trials == 0 {
            return Err(EngineError::Config("trial count must be at least 1".to_string()));
        }
        Ok(Self { inputs, config })
    }

    #[must_use]
    pub fn inputs(&self) -> &FrontierInputs {
        &self.inputs
    }

    #[must_use]
    pub fn config(&self) -> &FrontierConfig {
        &self.config
    }

    /// Score one weight vector. `None` when its risk is zero.
    pub fn evaluate(
        &self,
        trial: usize,
        weights: Vec<f64>,
    ) -> Result<Option<WeightedPortfolio>, EngineError> {
        let expected_return = portfolio_return(&weights, &self.inputs.mean_returns)?;
        let risk = portfolio_risk(&weights, &self.inputs.covariance)?;
        let sharpe = match sharpe_ratio(expected_return, risk) {
            Ok(s) if s.is_finite() => s,
            Ok(_) | Err(StatsError::DivisionByZero { .. }) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(WeightedPortfolio {
            trial,
            weights,
            expected_return,
            risk,
            sharpe,
        }))
    }

    /// Evaluate every trial sequentially, drawing weights from `source`
    pub fn run<S: WeightSource + ?Sized>(
        &self,
        source: &mut S,
        control: &RunControl,
    ) -> Result<FrontierReport, EngineError> {
        let trials = self.config.trials;
        let num_assets = self.inputs.universe.len();
        control.reset(trials);

        let mut simulation = SimulationResult::with_capacity(trials);
        let mut evaluated = 0;
        let mut skipped = 0;
        let mut termination = TerminationReason::Completed;

        for trial in 0..trials {
            if let Some(reason) = control.stop_reason() {
                termination = reason;
                break;
            }
            let weights = source.next_weights(num_assets)?;
            match self.evaluate(trial, weights)? {
                Some(point) => simulation.push(point),
                None => skipped += 1,
            }
            evaluated += 1;
            control.increment();
        }

        Ok(self.finish(simulation, evaluated, skipped, termination))
    }

    /// Evaluate trials across the rayon pool.
    ///
    /// Trials are split into fixed-size chunks, each with its own generator
    /// seeded from `seed` and the chunk index, and merged back in trial
    /// order. The result depends only on `seed`, never on scheduling.
    #[cfg(feature = "parallel")]
    pub fn run_parallel(&self, seed: u64, control: &RunControl) -> Result<FrontierReport, EngineError> {
        use rand::SeedableRng;
        use rand::rngs::SmallRng;
        use rayon::iter::{IntoParallelIterator, ParallelIterator};

        use crate::sampling::WeightSampler;

        struct ChunkOutcome {
            points: Vec<WeightedPortfolio>,
            evaluated: usize,
            skipped: usize,
            stopped: Option<TerminationReason>,
        }

        let trials = self.config.trials;
        let num_assets = self.inputs.universe.len();
        let num_chunks = trials.div_ceil(CHUNK_SIZE);
        control.reset(trials);

        let chunks = (0..num_chunks)
            .into_par_iter()
            .map(|chunk| -> Result<ChunkOutcome, EngineError> {
                let mut source =
                    WeightSampler::new(SmallRng::seed_from_u64(seed.wrapping_add(chunk as u64)));
                let start = chunk * CHUNK_SIZE;
                let end = (start + CHUNK_SIZE).min(trials);
                let mut outcome = ChunkOutcome {
                    points: Vec::with_capacity(end - start),
                    evaluated: 0,
                    skipped: 0,
                    stopped: None,
                };

                for trial in start..end {
                    if let Some(reason) = control.stop_reason() {
                        outcome.stopped = Some(reason);
                        break;
                    }
                    let weights = source.next_weights(num_assets)?;
                    match self.evaluate(trial, weights)? {
                        Some(point) => outcome.points.push(point),
                        None => outcome.skipped += 1,
                    }
                    outcome.evaluated += 1;
                    control.increment();
                }
                Ok(outcome)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut simulation = SimulationResult::with_capacity(trials);
        let mut evaluated = 0;
        let mut skipped = 0;
        let mut termination = TerminationReason::Completed;
        for chunk in chunks {
            evaluated += chunk.evaluated;
            skipped += chunk.skipped;
            if let Some(reason) = chunk.stopped
                && termination == TerminationReason::Completed
            {
                termination = reason;
            }
            for point in chunk.points {
                simulation.push(point);
            }
        }

        Ok(self.finish(simulation, evaluated, skipped, termination))
    }

    fn finish(
        &self,
        simulation: SimulationResult,
        evaluated: usize,
        skipped: usize,
        termination: TerminationReason,
    ) -> FrontierReport {
        let optimal = simulation.max_sharpe().cloned();
        let optimal_annualized = optimal.as_ref().map(|p| {
            annualize(p.expected_return, p.risk, self.config.trading_days_per_year)
        });

        match &optimal {
            Some(best) => tracing::info!(
                trials = evaluated,
                skipped,
                trial = best.trial,
                sharpe = best.sharpe,
                "frontier sweep finished"
            ),
            None => tracing::warn!(trials = evaluated, skipped, "frontier sweep produced no points"),
        }

        FrontierReport {
            tickers: self.inputs.universe.tickers().to_vec(),
            simulation,
            optimal,
            optimal_annualized,
            trials_requested: self.config.trials,
            trials_evaluated: evaluated,
            skipped_trials: skipped,
            termination,
        }
    }
}
