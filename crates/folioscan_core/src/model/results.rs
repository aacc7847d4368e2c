use serde::{Deserialize, Serialize};

use super::WeightedPortfolio;

/// Why a search or simulation loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Target reached (subset search)
    Converged,
    /// Every trial was evaluated (frontier)
    Completed,
    /// Iteration budget spent without reaching the target
    MaxIterationsReached,
    /// External cancel flag was raised
    Cancelled,
    /// Deadline passed
    TimedOut,
}

/// Accumulated trials of a frontier run, in trial order.
///
/// Append-only while the run is in progress, read-only afterward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    points: Vec<WeightedPortfolio>,
}

impl SimulationResult {
    #[must_use]
    pub fn with_capacity(trials: usize) -> Self {
        Self {
            points: Vec::with_capacity(trials),
        }
    }

    pub(crate) fn push(&mut self, point: WeightedPortfolio) {
        self.points.push(point);
    }

    #[must_use]
    pub fn points(&self) -> &[WeightedPortfolio] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn returns(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.expected_return)
    }

    pub fn risks(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.risk)
    }

    pub fn sharpes(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.sharpe)
    }

    /// Highest Sharpe ratio; the earliest trial wins ties
    #[must_use]
    pub fn max_sharpe(&self) -> Option<&WeightedPortfolio> {
        let mut best: Option<&WeightedPortfolio> = None;
        for point in &self.points {
            match best {
                Some(b) if point.sharpe <= b.sharpe => {}
                _ => best = Some(point),
            }
        }
        best
    }
}
