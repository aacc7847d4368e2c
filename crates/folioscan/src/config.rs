//! YAML run configuration
//!
//! Every field is optional; an empty file runs the search over a synthetic
//! market with the default parameters.
//!
//! ```yaml
//! data:
//!   prices: data/closes.csv
//!   benchmark_prices: data/ibov.csv
//!   start: 2024-01-29
//!   end: 2024-05-29
//! universe: [ABEV3.SA, AZUL4.SA, B3SA3.SA, BBAS3.SA, BBDC3.SA]
//! benchmark: ^BVSP
//! search:
//!   subset_size: 4
//!   target_cumulative_return: 1.12
//! frontier:
//!   tickers: [ABEV3.SA, BBAS3.SA, B3SA3.SA]
//!   trials: 10000
//! sectors:
//!   - name: Banks
//!     tickers: [BBAS3.SA, BBDC3.SA]
//! seed: 42
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use folioscan_core::distribution::AssetGroup;
use folioscan_core::frontier::FrontierConfig;
use folioscan_core::search::SearchConfig;
use folioscan_core::statistics::TRADING_DAYS_PER_YEAR;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// Error types for configuration loading
#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "IO error: {msg}"),
            ConfigError::Parse(msg) => write!(f, "Parse error: {msg}"),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Where prices come from and which dates to keep
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSection {
    /// Wide CSV of closes (`date,T1,T2,...`); synthetic data when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prices: Option<PathBuf>,

    /// Separate CSV holding the benchmark column; defaults to `prices`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark_prices: Option<PathBuf>,

    /// First date kept (inclusive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<Date>,

    /// Last date kept (exclusive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<Date>,

    pub synthetic: SyntheticSection,
}

/// Shape of the generated market when no price file is configured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticSection {
    pub assets: usize,
    pub trading_days: usize,
    pub start: Date,
}

impl Default for SyntheticSection {
    fn default() -> Self {
        Self {
            assets: 30,
            trading_days: 253,
            start: jiff::civil::date(2024, 1, 2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub subset_size: usize,
    pub batch_size: usize,
    pub max_iterations: usize,

    /// Prompted for on the console when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_cumulative_return: Option<f64>,
}

impl Default for SearchSection {
    fn default() -> Self {
        let defaults = SearchConfig::default();
        Self {
            subset_size: defaults.subset_size,
            batch_size: defaults.batch_size,
            max_iterations: defaults.max_iterations,
            target_cumulative_return: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontierSection {
    /// Assets to weight; the whole universe when empty
    pub tickers: Vec<String>,
    pub trials: usize,

    /// Write every trial as CSV for plotting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_csv: Option<PathBuf>,
}

impl Default for FrontierSection {
    fn default() -> Self {
        Self {
            tickers: Vec::new(),
            trials: FrontierConfig::default().trials,
            export_csv: None,
        }
    }
}

/// Full run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub data: DataSection,

    /// Tickers to search over; every priced ticker except the benchmark when empty
    pub universe: Vec<String>,

    /// Benchmark index symbol
    pub benchmark: String,

    pub search: SearchSection,
    pub frontier: FrontierSection,

    /// Named ticker groups summarized by `describe`
    pub sectors: Vec<AssetGroup>,

    pub trading_days_per_year: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data: DataSection::default(),
            universe: Vec::new(),
            benchmark: "^BVSP".to_string(),
            search: SearchSection::default(),
            frontier: FrontierSection::default(),
            sectors: Vec::new(),
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
            seed: None,
            timeout_secs: None,
        }
    }
}

impl RunConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_saphyr::from_str(yaml)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_saphyr::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {e}")))
    }

    /// Load from `path`, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::Io(format!("Failed to read config {}: {e}", path.display()))
        })?;
        Self::from_yaml(&content)
    }

    /// Checks that do not need price data
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.benchmark.trim().is_empty() {
            return Err(ConfigError::Invalid("benchmark symbol is empty".to_string()));
        }
        if let (Some(start), Some(end)) = (self.data.start, self.data.end)
            && start >= end
        {
            return Err(ConfigError::Invalid(format!(
                "data window is empty: start {start} is not before end {end}"
            )));
        }
        if self.trading_days_per_year == 0 {
            return Err(ConfigError::Invalid(
                "trading_days_per_year must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Core search parameters for a resolved target
    #[must_use]
    pub fn search_config(&self, target_cumulative_return: f64) -> SearchConfig {
        SearchConfig {
            subset_size: self.search.subset_size,
            batch_size: self.search.batch_size,
            target_cumulative_return,
            max_iterations: self.search.max_iterations,
            trading_days_per_year: self.trading_days_per_year,
        }
    }

    #[must_use]
    pub fn frontier_config(&self) -> FrontierConfig {
        FrontierConfig {
            trials: self.frontier.trials,
            trading_days_per_year: self.trading_days_per_year,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = RunConfig::from_yaml("{}").unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.search.subset_size, 4);
        assert_eq!(config.search.batch_size, 100);
        assert_eq!(config.search.max_iterations, 10_000);
        assert_eq!(config.frontier.trials, 10_000);
        assert_eq!(config.trading_days_per_year, 252);
        assert!(config.search.target_cumulative_return.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
data:
  prices: closes.csv
  start: 2024-01-29
  end: 2024-05-29
universe: [AAA, BBB, CCC]
benchmark: IDX
search:
  subset_size: 2
  target_cumulative_return: 1.12
frontier:
  tickers: [AAA, BBB]
  trials: 500
sectors:
  - name: Tech
    tickers: [AAA, BBB]
seed: 7
"#;
        let config = RunConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.data.prices, Some(PathBuf::from("closes.csv")));
        assert_eq!(config.data.start, Some(jiff::civil::date(2024, 1, 29)));
        assert_eq!(config.universe, vec!["AAA", "BBB", "CCC"]);
        assert_eq!(config.benchmark, "IDX");
        assert_eq!(config.search.subset_size, 2);
        assert_eq!(config.search.batch_size, 100);
        assert_eq!(config.search.target_cumulative_return, Some(1.12));
        assert_eq!(config.frontier.trials, 500);
        assert_eq!(config.sectors[0].name, "Tech");
        assert_eq!(config.seed, Some(7));

        let search = config.search_config(1.12);
        assert_eq!(search.subset_size, 2);
        assert_eq!(search.target_cumulative_return, 1.12);
    }

    #[test]
    fn test_reversed_window_is_rejected() {
        let yaml = "data:\n  start: 2024-05-29\n  end: 2024-01-29\n";
        assert!(matches!(
            RunConfig::from_yaml(yaml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_from_file_and_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("run.yaml");

        let mut config = RunConfig::default();
        config.universe = vec!["AAA".to_string(), "BBB".to_string()];
        config.seed = Some(3);
        fs::write(&path, config.to_yaml().unwrap()).unwrap();

        let loaded = RunConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);

        let missing = RunConfig::load(Some(&temp_dir.path().join("missing.yaml")));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
        assert_eq!(RunConfig::load(None).unwrap(), RunConfig::default());
    }
}
