//! Conversion of closing-price tables into daily percentage-change series.

use crate::error::DataError;
use crate::model::{AssetUniverse, PriceTable, ReturnMatrix, ReturnSeries};

/// Builds aligned daily return series from a `PriceTable`.
///
/// Rows holding a missing, non-finite, or non-positive close for any
/// requested ticker are dropped first; percentage changes are then taken
/// between consecutive surviving rows, so the first surviving row yields no
/// return and a return across a dropped row spans the gap.
#[derive(Debug, Clone, Copy)]
pub struct ReturnSeriesBuilder {
    min_observations: usize,
}

impl Default for ReturnSeriesBuilder {
    fn default() -> Self {
        Self {
            min_observations: 2,
        }
    }
}

impl ReturnSeriesBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum number of return rows required after trimming (at least 1)
    #[must_use]
    pub fn min_observations(mut self, min: usize) -> Self {
        self.min_observations = min.max(1);
        self
    }

    /// Returns for every column of the table
    pub fn build(&self, prices: &PriceTable) -> Result<ReturnMatrix, DataError> {
        self.build_selected(prices, prices.tickers())
    }

    /// Returns for the requested tickers only, in the order given
    pub fn build_selected(
        &self,
        prices: &PriceTable,
        tickers: &[String],
    ) -> Result<ReturnMatrix, DataError> {
        let universe = AssetUniverse::new(tickers.iter().cloned())?;
        let cols = tickers
            .iter()
            .map(|t| {
                prices
                    .column_index(t)
                    .ok_or_else(|| DataError::UnknownTicker(t.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let complete: Vec<(jiff::civil::Date, Vec<f64>)> = prices
            .rows()
            .iter()
            .filter_map(|row| {
                cols.iter()
                    .map(|&c| row.closes[c].filter(|p| p.is_finite() && *p > 0.0))
                    .collect::<Option<Vec<f64>>>()
                    .map(|closes| (row.date, closes))
            })
            .collect();

        let available = complete.len().saturating_sub(1);
        if available < self.min_observations {
            return Err(DataError::DataGap {
                required: self.min_observations,
                available,
            });
        }

        let mut dates = Vec::with_capacity(available);
        let mut columns = vec![Vec::with_capacity(available); cols.len()];
        for pair in complete.windows(2) {
            let (_, prev) = &pair[0];
            let (date, curr) = &pair[1];
            dates.push(*date);
            for (col, (p0, p1)) in columns.iter_mut().zip(prev.iter().zip(curr)) {
                col.push(p1 / p0 - 1.0);
            }
        }

        ReturnMatrix::new(
            universe,
            dates,
            columns.into_iter().map(ReturnSeries::new).collect(),
        )
    }

    /// Returns of a single-column table, e.g. a benchmark index
    pub fn build_series(&self, prices: &PriceTable) -> Result<ReturnSeries, DataError> {
        if prices.tickers().len() != 1 {
            return Err(DataError::NotSingleColumn {
                columns: prices.tickers().len(),
            });
        }
        let matrix = self.build(prices)?;
        Ok(matrix.columns()[0].clone())
    }
}
