//! Iterative random subset search
//!
//! Each iteration draws a batch of equal-weighted candidate portfolios,
//! keeps the best-scoring one, and stops once its cumulative return reaches
//! the target. The score rewards beating the benchmark's mean daily return
//! and compounding well:
//!
//! ```text
//! score = (mean(candidate) - mean(benchmark)) * cumulative(candidate)
//! ```

use rand::Rng;

use crate::control::RunControl;
use crate::error::EngineError;
use crate::model::{EqualWeightPortfolio, ReturnMatrix, ReturnSeries, TerminationReason};
use crate::sampling::sample_portfolio;
use crate::statistics::{SummaryStats, cumulative_return, mean_return};

use super::config::SearchConfig;
use super::result::{
    CandidateSummary, ConvergenceHistory, IterationRecord, SearchReport, SearchStatus,
};

/// Progress callback for subset search
///
/// Arguments: (iteration, `winner_cumulative_return`)
pub type ProgressCallback = Box<dyn Fn(usize, f64) + Send + Sync>;

/// Lifecycle of a search run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Searching,
    Converged,
    Exhausted,
}

/// A candidate together with the figures used to rank it
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub portfolio: EqualWeightPortfolio,
    pub mean_return: f64,
    pub cumulative_return: f64,
    pub score: f64,
}

/// Winner of one batch plus the number of candidates that could not be scored
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub winner: Option<ScoredCandidate>,
    pub skipped: usize,
}

/// Search engine over one universe of daily returns and one benchmark
pub struct SubsetSearchEngine<'a> {
    returns: &'a ReturnMatrix,
    benchmark_mean: f64,
    config: SearchConfig,
    progress: Option<ProgressCallback>,
}

impl<'a> SubsetSearchEngine<'a> {
    /// Validate inputs; misconfiguration is reported here, before any iteration.
    pub fn new(
        returns: &'a ReturnMatrix,
        benchmark: &ReturnSeries,
        config: SearchConfig,
    ) -> Result<Self, EngineError> {
        config.validate(returns.universe())?;
        if returns.num_observations() < 2 {
            return Err(EngineError::Config(format!(
                "need at least 2 trading days of returns, got {}",
                returns.num_observations()
            )));
        }
        let benchmark_mean = mean_return(benchmark.values())?;

        Ok(Self {
            returns,
            benchmark_mean,
            config,
            progress: None,
        })
    }

    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[must_use]
    pub fn benchmark_mean(&self) -> f64 {
        self.benchmark_mean
    }

    /// Composite ranking score of a candidate
    #[must_use]
    pub fn score(&self, mean_return: f64, cumulative_return: f64) -> f64 {
        (mean_return - self.benchmark_mean) * cumulative_return
    }

    fn score_candidate(&self, portfolio: EqualWeightPortfolio) -> Option<ScoredCandidate> {
        let series = portfolio.returns().values();
        let mean = mean_return(series).ok()?;
        let cumulative = cumulative_return(series).ok()?;
        let score = self.score(mean, cumulative);
        if !score.is_finite() {
            return None;
        }
        Some(ScoredCandidate {
            portfolio,
            mean_return: mean,
            cumulative_return: cumulative,
            score,
        })
    }

    /// Generate one batch of candidates and pick the highest score.
    ///
    /// Ties keep the earliest candidate in generation order.
    pub fn evaluate_batch<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<BatchOutcome, EngineError> {
        let mut winner: Option<ScoredCandidate> = None;
        let mut skipped = 0;

        for _ in 0..self.config.batch_size {
            let portfolio = sample_portfolio(rng, self.returns, self.config.subset_size)?;
            let Some(candidate) = self.score_candidate(portfolio) else {
                skipped += 1;
                continue;
            };
            match &winner {
                Some(best) if candidate.score <= best.score => {}
                _ => winner = Some(candidate),
            }
        }

        Ok(BatchOutcome { winner, skipped })
    }

    /// Start a run that can be driven one iteration at a time
    #[must_use]
    pub fn start(&self) -> SearchRun<'_, 'a> {
        SearchRun {
            engine: self,
            state: SearchState::Searching,
            termination: None,
            iteration: 0,
            last_winner: None,
            history: ConvergenceHistory::new(),
            skipped: 0,
        }
    }

    /// Run to a terminal state
    pub fn run<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        control: &RunControl,
    ) -> Result<SearchReport, EngineError> {
        control.reset(self.config.max_iterations);
        let mut run = self.start();
        while run.state() == SearchState::Searching {
            run.step(rng, control)?;
        }
        run.finish()
    }
}

/// In-progress search: a small state machine over `SearchState`
pub struct SearchRun<'e, 'a> {
    engine: &'e SubsetSearchEngine<'a>,
    state: SearchState,
    termination: Option<TerminationReason>,
    iteration: usize,
    last_winner: Option<ScoredCandidate>,
    history: ConvergenceHistory,
    skipped: usize,
}

impl SearchRun<'_, '_> {
    #[must_use]
    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Iterations evaluated so far
    #[must_use]
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    #[must_use]
    pub fn last_winner(&self) -> Option<&ScoredCandidate> {
        self.last_winner.as_ref()
    }

    fn exhaust(&mut self, reason: TerminationReason) {
        self.state = SearchState::Exhausted;
        self.termination = Some(reason);
        tracing::info!(
            iterations = self.iteration,
            reason = ?reason,
            best = ?self.history.best_cumulative_return(),
            "subset search exhausted"
        );
    }

    /// Advance by one iteration. Terminal states are left unchanged.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        control: &RunControl,
    ) -> Result<SearchState, EngineError> {
        if self.state != SearchState::Searching {
            return Ok(self.state);
        }

        let engine = self.engine;
        let config = &engine.config;
        if self.iteration >= config.max_iterations {
            self.exhaust(TerminationReason::MaxIterationsReached);
            return Ok(self.state);
        }
        if let Some(reason) = control.stop_reason() {
            self.exhaust(reason);
            return Ok(self.state);
        }

        let batch = engine.evaluate_batch(rng)?;
        self.iteration += 1;
        self.skipped += batch.skipped;
        control.increment();

        if batch.skipped > 0 {
            tracing::debug!(
                iteration = self.iteration,
                skipped = batch.skipped,
                "skipped candidates with non-finite score"
            );
        }

        if let Some(winner) = batch.winner {
            self.history.record(IterationRecord {
                iteration: self.iteration,
                winner_score: winner.score,
                winner_cumulative_return: winner.cumulative_return,
            });
            if let Some(callback) = &engine.progress {
                callback(self.iteration, winner.cumulative_return);
            }
            tracing::debug!(
                iteration = self.iteration,
                score = winner.score,
                cumulative_return = winner.cumulative_return,
                "iteration winner"
            );

            let reached = winner.cumulative_return >= config.target_cumulative_return;
            self.last_winner = Some(winner);
            if reached {
                self.state = SearchState::Converged;
                self.termination = Some(TerminationReason::Converged);
                tracing::info!(iterations = self.iteration, "subset search converged");
                return Ok(self.state);
            }
        }

        if self.iteration >= config.max_iterations {
            self.exhaust(TerminationReason::MaxIterationsReached);
        }
        Ok(self.state)
    }

    /// Build the report. A run still in `Searching` is reported as cancelled.
    pub fn finish(self) -> Result<SearchReport, EngineError> {
        let engine = self.engine;
        let universe = engine.returns.universe();

        let last_winner = self.last_winner.as_ref().map(|w| CandidateSummary {
            assets: w.portfolio.tickers(universe),
            mean_daily_return: w.mean_return,
            cumulative_return: w.cumulative_return,
            score: w.score,
        });

        let (status, assets, stats) = match (self.state, &self.last_winner) {
            (SearchState::Converged, Some(winner)) => {
                let stats = SummaryStats::from_series(
                    winner.portfolio.returns().values(),
                    engine.config.trading_days_per_year,
                )?;
                (
                    SearchStatus::Converged,
                    Some(winner.portfolio.tickers(universe)),
                    Some(stats),
                )
            }
            _ => (SearchStatus::Exhausted, None, None),
        };

        Ok(SearchReport {
            status,
            termination: self.termination.unwrap_or(TerminationReason::Cancelled),
            iterations: self.iteration,
            target_cumulative_return: engine.config.target_cumulative_return,
            assets,
            stats,
            last_winner,
            skipped_candidates: self.skipped,
            history: self.history,
        })
    }
}
