use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::DataError;

use super::AssetId;

/// The set of distinct tickers a run samples from.
///
/// Fixed for the duration of one run. Assets are addressed by their
/// position (`AssetId`) so candidate portfolios stay cheap to copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct AssetUniverse {
    tickers: Vec<String>,
}

impl AssetUniverse {
    /// Create a universe, rejecting duplicate tickers.
    pub fn new<I, S>(tickers: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tickers: Vec<String> = tickers.into_iter().map(Into::into).collect();
        let mut seen = FxHashMap::default();
        for (idx, ticker) in tickers.iter().enumerate() {
            if seen.insert(ticker.as_str(), idx).is_some() {
                return Err(DataError::DuplicateTicker(ticker.clone()));
            }
        }
        Ok(Self { tickers })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    #[must_use]
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    #[must_use]
    pub fn ticker(&self, id: AssetId) -> Option<&str> {
        self.tickers.get(id.index()).map(String::as_str)
    }

    /// Look up the id of a ticker
    #[must_use]
    pub fn position(&self, ticker: &str) -> Option<AssetId> {
        self.tickers
            .iter()
            .position(|t| t == ticker)
            .map(|idx| AssetId(idx as u32))
    }

    pub fn ids(&self) -> impl Iterator<Item = AssetId> + '_ {
        (0..self.tickers.len()).map(|idx| AssetId(idx as u32))
    }

    /// Resolve ids back to tickers, skipping ids outside the universe
    #[must_use]
    pub fn tickers_for(&self, ids: &[AssetId]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| self.ticker(*id))
            .map(str::to_owned)
            .collect()
    }
}

impl TryFrom<Vec<String>> for AssetUniverse {
    type Error = DataError;

    fn try_from(tickers: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(tickers)
    }
}

impl From<AssetUniverse> for Vec<String> {
    fn from(universe: AssetUniverse) -> Self {
        universe.tickers
    }
}
