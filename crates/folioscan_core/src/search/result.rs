//! Subset search result types

use serde::{Deserialize, Serialize};

use crate::model::TerminationReason;
use crate::statistics::SummaryStats;

/// Terminal outcome visible to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchStatus {
    Converged,
    Exhausted,
}

/// Score breakdown of one iteration winner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub assets: Vec<String>,
    pub mean_daily_return: f64,
    pub cumulative_return: f64,
    pub score: f64,
}

/// Winner figures for a single iteration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// 1-based iteration number
    pub iteration: usize,
    pub winner_score: f64,
    pub winner_cumulative_return: f64,
}

/// Per-iteration winners of a search run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceHistory {
    pub records: Vec<IterationRecord>,

    /// Best winner cumulative return seen up to each record (monotone)
    pub best_cumulative_returns: Vec<f64>,
}

impl ConvergenceHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: IterationRecord) {
        let best = self
            .best_cumulative_returns
            .last()
            .copied()
            .unwrap_or(f64::NEG_INFINITY)
            .max(record.winner_cumulative_return);
        self.best_cumulative_returns.push(best);
        self.records.push(record);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Best cumulative return reached by any iteration winner
    #[must_use]
    pub fn best_cumulative_return(&self) -> Option<f64> {
        self.best_cumulative_returns.last().copied()
    }
}

/// Final result of a subset search.
///
/// `assets` and `stats` are `null` unless the search converged;
/// `last_winner` is kept for diagnostics either way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    pub status: SearchStatus,
    pub termination: TerminationReason,

    /// Iterations evaluated
    pub iterations: usize,

    pub target_cumulative_return: f64,

    pub assets: Option<Vec<String>>,

    #[serde(flatten, with = "nullable_stats")]
    pub stats: Option<SummaryStats>,

    pub last_winner: Option<CandidateSummary>,

    /// Candidates dropped because their score was not finite
    pub skipped_candidates: usize,

    #[serde(skip_serializing_if = "ConvergenceHistory::is_empty", default)]
    pub history: ConvergenceHistory,
}

/// Writes the winner's statistics as top-level fields that are `null` when
/// the search did not converge, so both outcomes share one JSON shape.
mod nullable_stats {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::statistics::SummaryStats;

    #[derive(Default, Serialize, Deserialize)]
    struct StatFields {
        mean_daily_return: Option<f64>,
        std_daily_return: Option<f64>,
        annual_mean: Option<f64>,
        annual_std: Option<f64>,
        cumulative_return: Option<f64>,
    }

    pub fn serialize<S: Serializer>(
        stats: &Option<SummaryStats>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let fields = match stats {
            Some(s) => StatFields {
                mean_daily_return: Some(s.mean_daily_return),
                std_daily_return: Some(s.std_daily_return),
                annual_mean: Some(s.annual_mean),
                annual_std: Some(s.annual_std),
                cumulative_return: Some(s.cumulative_return),
            },
            None => StatFields::default(),
        };
        fields.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<SummaryStats>, D::Error> {
        let fields = StatFields::deserialize(deserializer)?;
        Ok(match fields {
            StatFields {
                mean_daily_return: Some(mean_daily_return),
                std_daily_return: Some(std_daily_return),
                annual_mean: Some(annual_mean),
                annual_std: Some(annual_std),
                cumulative_return: Some(cumulative_return),
            } => Some(SummaryStats {
                mean_daily_return,
                std_daily_return,
                annual_mean,
                annual_std,
                cumulative_return,
            }),
            _ => None,
        })
    }
}

impl SearchReport {
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.status == SearchStatus::Converged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_tracks_running_best() {
        let mut history = ConvergenceHistory::new();
        for (i, cum) in [1.01, 1.05, 0.98, 1.07].into_iter().enumerate() {
            history.record(IterationRecord {
                iteration: i + 1,
                winner_score: 0.0,
                winner_cumulative_return: cum,
            });
        }
        assert_eq!(history.best_cumulative_returns, vec![1.01, 1.05, 1.05, 1.07]);
        assert_eq!(history.best_cumulative_return(), Some(1.07));
    }
}
