//! Distribution summaries of daily returns (the figures behind a box plot).

use serde::{Deserialize, Serialize};

use crate::error::{DataError, EngineError, StatsError};
use crate::model::{ReturnMatrix, ReturnSeries};

/// Tukey fence multiplier
pub const OUTLIER_IQR_MULTIPLIER: f64 = 1.5;

/// Quartiles, fences, and outliers of one return series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxPlotSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub iqr: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
    /// Most extreme values still inside the fences
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    /// (row position, value) of every point outside the fences
    pub outliers: Vec<(usize, f64)>,
}

/// Quantile with linear interpolation between order statistics.
///
/// `sorted` must be ascending and non-empty; `q` is clamped to `[0, 1]`.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

pub fn quantile(series: &[f64], q: f64) -> Result<f64, StatsError> {
    if series.is_empty() {
        return Err(StatsError::EmptySeries);
    }
    let mut sorted = series.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(quantile_sorted(&sorted, q))
}

pub fn box_plot_summary(series: &[f64]) -> Result<BoxPlotSummary, StatsError> {
    if series.is_empty() {
        return Err(StatsError::EmptySeries);
    }
    let mut sorted = series.to_vec();
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile_sorted(&sorted, 0.25);
    let median = quantile_sorted(&sorted, 0.50);
    let q3 = quantile_sorted(&sorted, 0.75);
    let iqr = q3 - q1;
    let lower_fence = q1 - OUTLIER_IQR_MULTIPLIER * iqr;
    let upper_fence = q3 + OUTLIER_IQR_MULTIPLIER * iqr;

    let inside = |x: &f64| *x >= lower_fence && *x <= upper_fence;
    let lower_whisker = sorted.iter().copied().find(inside).unwrap_or(q1);
    let upper_whisker = sorted.iter().rev().copied().find(inside).unwrap_or(q3);

    let outliers = series
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, x)| !inside(x))
        .collect();

    Ok(BoxPlotSummary {
        min: sorted[0],
        q1,
        median,
        q3,
        max: sorted[sorted.len() - 1],
        iqr,
        lower_fence,
        upper_fence,
        lower_whisker,
        upper_whisker,
        outliers,
    })
}

/// Named group of tickers, e.g. a sector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetGroup {
    pub name: String,
    pub tickers: Vec<String>,
}

/// Equal-weighted daily series for each group, in group order
pub fn group_averages(
    returns: &ReturnMatrix,
    groups: &[AssetGroup],
) -> Result<Vec<(String, ReturnSeries)>, EngineError> {
    groups
        .iter()
        .map(|group| {
            let ids = group
                .tickers
                .iter()
                .map(|t| {
                    returns
                        .universe()
                        .position(t)
                        .ok_or_else(|| DataError::UnknownTicker(t.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            let series = returns.equal_weight_average(&ids)?;
            Ok((group.name.clone(), series))
        })
        .collect()
}
