//! Synthetic closing-price generator for demos, tests, and benchmarks.

use jiff::ToSpan;
use jiff::civil::{Date, Weekday};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::model::{PriceRow, PriceTable};

/// Normally distributed daily returns for one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticAsset {
    pub ticker: String,
    pub daily_mean: f64,
    pub daily_std: f64,
    pub initial_price: f64,
}

/// Business-day price table made of independent normal daily returns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticMarket {
    pub start: Date,
    /// Number of price rows (returns are one fewer)
    pub trading_days: usize,
    pub assets: Vec<SyntheticAsset>,
}

impl SyntheticMarket {
    /// `n` assets with drifts from -0.05% to +0.15% per day and rising volatility
    #[must_use]
    pub fn spread(prefix: &str, n: usize, start: Date, trading_days: usize) -> Self {
        let assets = (0..n)
            .map(|i| {
                let t = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.5 };
                SyntheticAsset {
                    ticker: format!("{prefix}{i:02}"),
                    daily_mean: -0.0005 + 0.002 * t,
                    daily_std: 0.01 + 0.02 * t,
                    initial_price: 50.0 + 10.0 * i as f64,
                }
            })
            .collect();
        Self {
            start,
            trading_days,
            assets,
        }
    }

    /// Weekdays starting at `start` (or the next weekday)
    #[must_use]
    pub fn business_days(&self) -> Vec<Date> {
        let mut dates = Vec::with_capacity(self.trading_days);
        let mut day = self.start;
        while dates.len() < self.trading_days {
            if !matches!(day.weekday(), Weekday::Saturday | Weekday::Sunday) {
                dates.push(day);
            }
            day = day.saturating_add(1.day());
        }
        dates
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<PriceTable, EngineError> {
        let distributions = self
            .assets
            .iter()
            .map(|a| {
                Normal::new(a.daily_mean, a.daily_std).map_err(|e| {
                    EngineError::Config(format!("invalid return profile for {}: {e}", a.ticker))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut prices: Vec<f64> = self.assets.iter().map(|a| a.initial_price).collect();
        let rows = self
            .business_days()
            .into_iter()
            .enumerate()
            .map(|(day, date)| {
                if day > 0 {
                    for (price, dist) in prices.iter_mut().zip(&distributions) {
                        // Floor the daily loss so prices stay positive
                        *price *= 1.0 + dist.sample(&mut *rng).max(-0.95);
                    }
                }
                PriceRow {
                    date,
                    closes: prices.iter().copied().map(Some).collect(),
                }
            })
            .collect();

        let tickers = self.assets.iter().map(|a| a.ticker.clone()).collect();
        Ok(PriceTable::new(tickers, rows)?)
    }
}
