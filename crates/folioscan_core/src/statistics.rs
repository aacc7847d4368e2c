//! Return and risk statistics shared by both engines.
//!
//! Dispersion uses the sample convention (N-1 denominator) everywhere:
//! standard deviation, variance, and the covariance matrix feeding
//! `portfolio_risk`. Keeping a single convention keeps subset-search and
//! frontier figures comparable.

use serde::{Deserialize, Serialize};

use crate::error::StatsError;
use crate::model::ReturnMatrix;

/// Trading sessions used to annualize daily figures
pub const TRADING_DAYS_PER_YEAR: u32 = 252;

/// Arithmetic mean of a return series
pub fn mean_return(series: &[f64]) -> Result<f64, StatsError> {
    if series.is_empty() {
        return Err(StatsError::EmptySeries);
    }
    Ok(series.iter().sum::<f64>() / series.len() as f64)
}

/// Sums of deviations from the first observation.
///
/// Shifting by a sample value avoids cancellation and makes a constant
/// series produce an exact zero.
fn shifted_sums(series: &[f64]) -> (f64, f64) {
    let shift = series[0];
    series.iter().fold((0.0, 0.0), |(s1, s2), x| {
        let d = x - shift;
        (s1 + d, s2 + d * d)
    })
}

fn require_sample(len: usize) -> Result<(), StatsError> {
    match len {
        0 => Err(StatsError::EmptySeries),
        1 => Err(StatsError::InsufficientObservations {
            required: 2,
            available: 1,
        }),
        _ => Ok(()),
    }
}

/// Sample variance (N-1 denominator)
pub fn variance(series: &[f64]) -> Result<f64, StatsError> {
    require_sample(series.len())?;
    let n = series.len() as f64;
    let (s1, s2) = shifted_sums(series);
    Ok(((s2 - s1 * s1 / n) / (n - 1.0)).max(0.0))
}

/// Sample standard deviation (N-1 denominator)
pub fn std_deviation(series: &[f64]) -> Result<f64, StatsError> {
    variance(series).map(f64::sqrt)
}

/// Final compounded growth factor: the product of `1 + r`.
///
/// 1.12 means +12% over the period.
pub fn cumulative_return(series: &[f64]) -> Result<f64, StatsError> {
    if series.is_empty() {
        return Err(StatsError::EmptySeries);
    }
    Ok(series.iter().map(|r| 1.0 + r).product())
}

/// Running compounded growth factor for each day
#[must_use]
pub fn cumulative_path(series: &[f64]) -> Vec<f64> {
    series
        .iter()
        .scan(1.0, |growth, r| {
            *growth *= 1.0 + r;
            Some(*growth)
        })
        .collect()
}

/// Daily figures scaled to a year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualizedStats {
    pub mean: f64,
    pub std_dev: f64,
}

/// Compound the daily mean and scale the daily deviation by `sqrt(days)`
#[must_use]
pub fn annualize(mean_daily: f64, std_daily: f64, trading_days_per_year: u32) -> AnnualizedStats {
    AnnualizedStats {
        mean: (1.0 + mean_daily).powf(f64::from(trading_days_per_year)) - 1.0,
        std_dev: std_daily * f64::from(trading_days_per_year).sqrt(),
    }
}

/// Mean over standard deviation, with a zero risk-free rate
pub fn sharpe_ratio(mean_return: f64, std_deviation: f64) -> Result<f64, StatsError> {
    if std_deviation == 0.0 {
        return Err(StatsError::DivisionByZero {
            context: "sharpe ratio",
        });
    }
    Ok(mean_return / std_deviation)
}

/// Expected portfolio return: `w · mu`
pub fn portfolio_return(weights: &[f64], mean_returns: &[f64]) -> Result<f64, StatsError> {
    if weights.len() != mean_returns.len() {
        return Err(StatsError::DimensionMismatch {
            expected: mean_returns.len(),
            actual: weights.len(),
        });
    }
    Ok(weights.iter().zip(mean_returns).map(|(w, m)| w * m).sum())
}

/// Portfolio standard deviation: `sqrt(w' C w)`.
///
/// A slightly negative quadratic form (round-off on a degenerate covariance)
/// is clamped to zero.
pub fn portfolio_risk(weights: &[f64], covariance: &[Vec<f64>]) -> Result<f64, StatsError> {
    let n = weights.len();
    if covariance.len() != n {
        return Err(StatsError::DimensionMismatch {
            expected: covariance.len(),
            actual: n,
        });
    }

    let mut quad = 0.0;
    for (row, w_i) in covariance.iter().zip(weights) {
        if row.len() != n {
            return Err(StatsError::DimensionMismatch {
                expected: n,
                actual: row.len(),
            });
        }
        let inner: f64 = row.iter().zip(weights).map(|(c, w_j)| c * w_j).sum();
        quad += w_i * inner;
    }

    Ok(quad.max(0.0).sqrt())
}

/// Mean daily return of every column
pub fn mean_vector(returns: &ReturnMatrix) -> Result<Vec<f64>, StatsError> {
    returns
        .columns()
        .iter()
        .map(|col| mean_return(col.values()))
        .collect()
}

/// Sample covariance matrix of the columns (N-1 denominator)
pub fn covariance_matrix(returns: &ReturnMatrix) -> Result<Vec<Vec<f64>>, StatsError> {
    let n_obs = returns.num_observations();
    require_sample(n_obs)?;
    let n = n_obs as f64;

    let columns = returns.columns();
    let shifted: Vec<(f64, Vec<f64>)> = columns
        .iter()
        .map(|col| {
            let shift = col.values()[0];
            let devs: Vec<f64> = col.values().iter().map(|x| x - shift).collect();
            (devs.iter().sum(), devs)
        })
        .collect();

    let k = columns.len();
    let mut cov = vec![vec![0.0; k]; k];
    for i in 0..k {
        for j in i..k {
            let (sum_i, devs_i) = &shifted[i];
            let (sum_j, devs_j) = &shifted[j];
            let cross: f64 = devs_i.iter().zip(devs_j).map(|(a, b)| a * b).sum();
            let value = (cross - sum_i * sum_j / n) / (n - 1.0);
            cov[i][j] = value;
            cov[j][i] = value;
        }
    }
    Ok(cov)
}

/// Descriptive figures reported for a winning portfolio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub mean_daily_return: f64,
    pub std_daily_return: f64,
    pub annual_mean: f64,
    pub annual_std: f64,
    pub cumulative_return: f64,
}

impl SummaryStats {
    pub fn from_series(series: &[f64], trading_days_per_year: u32) -> Result<Self, StatsError> {
        let mean_daily_return = mean_return(series)?;
        let std_daily_return = std_deviation(series)?;
        let annual = annualize(mean_daily_return, std_daily_return, trading_days_per_year);
        Ok(Self {
            mean_daily_return,
            std_daily_return,
            annual_mean: annual.mean,
            annual_std: annual.std_dev,
            cumulative_return: cumulative_return(series)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssetUniverse, ReturnSeries};

    const EPS: f64 = 1e-12;

    #[test]
    fn test_mean_and_std() {
        let series = [0.01, -0.02, 0.03, 0.00];
        let mean = mean_return(&series).unwrap();
        assert!((mean - 0.005).abs() < EPS);

        // Sample variance: sum of squared deviations / (n - 1)
        let expected_var = [0.005, -0.025, 0.025, -0.005]
            .iter()
            .map(|d| d * d)
            .sum::<f64>()
            / 3.0;
        assert!((variance(&series).unwrap() - expected_var).abs() < EPS);
        assert!((std_deviation(&series).unwrap() - expected_var.sqrt()).abs() < EPS);
    }

    #[test]
    fn test_empty_and_short_series() {
        assert_eq!(mean_return(&[]), Err(StatsError::EmptySeries));
        assert_eq!(std_deviation(&[]), Err(StatsError::EmptySeries));
        assert_eq!(cumulative_return(&[]), Err(StatsError::EmptySeries));
        assert_eq!(
            std_deviation(&[0.01]),
            Err(StatsError::InsufficientObservations {
                required: 2,
                available: 1
            })
        );
    }

    #[test]
    fn test_constant_series_sharpe_divides_by_zero() {
        let series = [0.01, 0.01, 0.01];
        let std = std_deviation(&series).unwrap();
        assert_eq!(std, 0.0);
        let mean = mean_return(&series).unwrap();
        assert_eq!(
            sharpe_ratio(mean, std),
            Err(StatsError::DivisionByZero {
                context: "sharpe ratio"
            })
        );
    }

    #[test]
    fn test_cumulative_return_is_product() {
        let series = [0.10, -0.05, 0.02, 0.07];
        let expected = 1.10 * 0.95 * 1.02 * 1.07;
        assert!((cumulative_return(&series).unwrap() - expected).abs() < EPS);

        let path = cumulative_path(&series);
        assert_eq!(path.len(), 4);
        assert!((path[1] - 1.10 * 0.95).abs() < EPS);
        assert!((path[3] - expected).abs() < EPS);
    }

    #[test]
    fn test_annualize() {
        let annual = annualize(0.001, 0.01, TRADING_DAYS_PER_YEAR);
        assert!((annual.mean - (1.001f64.powi(252) - 1.0)).abs() < EPS);
        assert!((annual.std_dev - 0.01 * 252f64.sqrt()).abs() < EPS);
    }

    #[test]
    fn test_portfolio_return_bounded_by_means() {
        let mu = [0.001, -0.0005, 0.002, 0.0007];
        let lo = mu.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = mu.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        for weights in [
            [0.25, 0.25, 0.25, 0.25],
            [1.0, 0.0, 0.0, 0.0],
            [0.1, 0.6, 0.2, 0.1],
            [0.0, 0.0, 0.0, 1.0],
        ] {
            let r = portfolio_return(&weights, &mu).unwrap();
            assert!(r >= lo - EPS && r <= hi + EPS, "{r} outside [{lo}, {hi}]");
        }

        assert_eq!(
            portfolio_return(&[0.5, 0.5], &mu),
            Err(StatsError::DimensionMismatch {
                expected: 4,
                actual: 2
            })
        );
    }

    #[test]
    fn test_portfolio_risk() {
        let cov = vec![vec![0.04, 0.01], vec![0.01, 0.09]];
        let risk = portfolio_risk(&[0.5, 0.5], &cov).unwrap();
        let expected = (0.25 * 0.04 + 2.0 * 0.25 * 0.01 + 0.25 * 0.09f64).sqrt();
        assert!((risk - expected).abs() < EPS);

        // Round-off on a degenerate matrix must not produce NaN
        let degenerate = vec![vec![1.0, 1.0 + 1e-12], vec![1.0 + 1e-12, 1.0]];
        let risk = portfolio_risk(&[1.0, -1.0], &degenerate).unwrap();
        assert!(risk >= 0.0 && risk.is_finite());
    }

    #[test]
    fn test_covariance_matches_variance() {
        let universe = AssetUniverse::new(["A", "B"]).unwrap();
        let a = vec![0.01, 0.03, -0.02, 0.00, 0.015];
        let b = vec![-0.01, 0.02, 0.01, 0.005, -0.02];
        let dates = (1..=5).map(|d| jiff::civil::date(2024, 3, d)).collect();
        let matrix = ReturnMatrix::new(
            universe,
            dates,
            vec![ReturnSeries::new(a.clone()), ReturnSeries::new(b.clone())],
        )
        .unwrap();

        let cov = covariance_matrix(&matrix).unwrap();
        assert!((cov[0][0] - variance(&a).unwrap()).abs() < EPS);
        assert!((cov[1][1] - variance(&b).unwrap()).abs() < EPS);
        assert_eq!(cov[0][1], cov[1][0]);

        // Single-asset portfolio risk equals that asset's deviation
        let risk = portfolio_risk(&[1.0, 0.0], &cov).unwrap();
        assert!((risk - std_deviation(&a).unwrap()).abs() < EPS);

        let mu = mean_vector(&matrix).unwrap();
        assert!((mu[0] - mean_return(&a).unwrap()).abs() < EPS);
    }
}
