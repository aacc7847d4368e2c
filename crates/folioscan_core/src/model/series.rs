//! Price tables and the daily return series derived from them

use jiff::civil::Date;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{DataError, SamplingError};

use super::{AssetId, AssetUniverse};

/// Ordered daily returns, one per trading day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReturnSeries {
    values: Vec<f64>,
}

impl ReturnSeries {
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.values.iter()
    }

    #[must_use]
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

impl AsRef<[f64]> for ReturnSeries {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}

impl From<Vec<f64>> for ReturnSeries {
    fn from(values: Vec<f64>) -> Self {
        Self { values }
    }
}

impl FromIterator<f64> for ReturnSeries {
    fn from_iter<T: IntoIterator<Item = f64>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// One trading day of closing prices; `None` marks a missing quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub date: Date,
    pub closes: Vec<Option<f64>>,
}

/// Closing prices indexed by `[date, ticker]`, as handed over by a data source.
///
/// Rows are kept in chronological order regardless of input order.
#[derive(Debug, Clone)]
pub struct PriceTable {
    tickers: Vec<String>,
    rows: Vec<PriceRow>,
    index: FxHashMap<String, usize>,
}

impl PriceTable {
    pub fn new(tickers: Vec<String>, mut rows: Vec<PriceRow>) -> Result<Self, DataError> {
        let mut index = FxHashMap::default();
        for (col, ticker) in tickers.iter().enumerate() {
            if index.insert(ticker.clone(), col).is_some() {
                return Err(DataError::DuplicateTicker(ticker.clone()));
            }
        }

        for (row_idx, row) in rows.iter().enumerate() {
            if row.closes.len() != tickers.len() {
                return Err(DataError::RowLengthMismatch {
                    row: row_idx,
                    expected: tickers.len(),
                    actual: row.closes.len(),
                });
            }
        }

        rows.sort_by_key(|row| row.date);

        Ok(Self {
            tickers,
            rows,
            index,
        })
    }

    #[must_use]
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    #[must_use]
    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    #[must_use]
    pub fn column_index(&self, ticker: &str) -> Option<usize> {
        self.index.get(ticker).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep only rows whose date falls in `[start, end)`
    #[must_use]
    pub fn window(mut self, start: Option<Date>, end: Option<Date>) -> Self {
        self.rows.retain(|row| {
            start.is_none_or(|s| row.date >= s) && end.is_none_or(|e| row.date < e)
        });
        self
    }
}

/// Per-asset daily returns aligned on the same trading dates
#[derive(Debug, Clone)]
pub struct ReturnMatrix {
    universe: AssetUniverse,
    dates: Vec<Date>,
    columns: Vec<ReturnSeries>,
}

impl ReturnMatrix {
    /// Assemble a matrix; every column must have one value per date.
    pub fn new(
        universe: AssetUniverse,
        dates: Vec<Date>,
        columns: Vec<ReturnSeries>,
    ) -> Result<Self, DataError> {
        if columns.len() != universe.len() {
            return Err(DataError::RowLengthMismatch {
                row: 0,
                expected: universe.len(),
                actual: columns.len(),
            });
        }
        if let Some((col, series)) = columns
            .iter()
            .enumerate()
            .find(|(_, series)| series.len() != dates.len())
        {
            return Err(DataError::RowLengthMismatch {
                row: col,
                expected: dates.len(),
                actual: series.len(),
            });
        }

        Ok(Self {
            universe,
            dates,
            columns,
        })
    }

    #[must_use]
    pub fn universe(&self) -> &AssetUniverse {
        &self.universe
    }

    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    #[must_use]
    pub fn columns(&self) -> &[ReturnSeries] {
        &self.columns
    }

    #[must_use]
    pub fn column(&self, id: AssetId) -> Option<&ReturnSeries> {
        self.columns.get(id.index())
    }

    /// Number of trading days (rows)
    #[must_use]
    pub fn num_observations(&self) -> usize {
        self.dates.len()
    }

    /// Arithmetic mean across the given assets for each trading day.
    ///
    /// Ids outside the universe are ignored; an empty selection is an error.
    pub fn equal_weight_average(&self, assets: &[AssetId]) -> Result<ReturnSeries, SamplingError> {
        let selected: Vec<&ReturnSeries> = assets.iter().filter_map(|id| self.column(*id)).collect();
        if selected.is_empty() {
            return Err(SamplingError::EmptyUniverse);
        }

        let k = selected.len() as f64;
        Ok((0..self.dates.len())
            .map(|row| selected.iter().map(|col| col.values()[row]).sum::<f64>() / k)
            .collect())
    }

    /// Restrict the matrix to a subset of tickers, in the order given
    pub fn select(&self, tickers: &[String]) -> Result<ReturnMatrix, DataError> {
        let mut columns = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            let id = self
                .universe
                .position(ticker)
                .ok_or_else(|| DataError::UnknownTicker(ticker.clone()))?;
            columns.push(self.columns[id.index()].clone());
        }
        let universe = AssetUniverse::new(tickers.iter().cloned())?;
        Ok(Self {
            universe,
            dates: self.dates.clone(),
            columns,
        })
    }
}
