//! Price sources: where closing prices come from
//!
//! The engines only see `PriceTable`s. A `PriceSource` produces them for a
//! list of tickers and a date window, either from CSV files on disk or from
//! a seeded synthetic market.

use std::path::{Path, PathBuf};

use folioscan_core::error::DataError;
use folioscan_core::model::{PriceRow, PriceTable};
use folioscan_core::synthetic::{SyntheticAsset, SyntheticMarket};
use jiff::civil::Date;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Error types for price loading
#[derive(Debug)]
pub enum SourceError {
    Io(String),
    Parse(String),
    Generate(String),
    Data(DataError),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Io(msg) => write!(f, "IO error: {msg}"),
            SourceError::Parse(msg) => write!(f, "Parse error: {msg}"),
            SourceError::Generate(msg) => write!(f, "Synthetic market error: {msg}"),
            SourceError::Data(e) => write!(f, "Data error: {e}"),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Data(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DataError> for SourceError {
    fn from(e: DataError) -> Self {
        SourceError::Data(e)
    }
}

/// Supplier of adjusted closing prices.
///
/// Windows are half-open: `start` inclusive, `end` exclusive; `None` leaves
/// that side unbounded.
pub trait PriceSource {
    /// Every ticker this source can price
    fn available_tickers(&self) -> Result<Vec<String>, SourceError>;

    fn fetch_adjusted_closes(
        &self,
        tickers: &[String],
        start: Option<Date>,
        end: Option<Date>,
    ) -> Result<PriceTable, SourceError>;

    /// Single-column table for the benchmark index
    fn fetch_benchmark_closes(
        &self,
        symbol: &str,
        start: Option<Date>,
        end: Option<Date>,
    ) -> Result<PriceTable, SourceError> {
        self.fetch_adjusted_closes(&[symbol.to_string()], start, end)
    }
}

/// Keep only `tickers`, in the order given
fn project(table: &PriceTable, tickers: &[String]) -> Result<PriceTable, DataError> {
    let cols = tickers
        .iter()
        .map(|t| {
            table
                .column_index(t)
                .ok_or_else(|| DataError::UnknownTicker(t.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let rows = table
        .rows()
        .iter()
        .map(|row| PriceRow {
            date: row.date,
            closes: cols.iter().map(|&c| row.closes[c]).collect(),
        })
        .collect();
    PriceTable::new(tickers.to_vec(), rows)
}

/// Parse one price cell. Blank, non-numeric, and non-finite cells are missing.
fn parse_close(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Read a wide CSV of closes: a `date` column followed by one column per ticker
pub fn read_price_csv(path: &Path) -> Result<PriceTable, SourceError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| SourceError::Io(format!("Failed to open {}: {e}", path.display())))?;

    let headers = rdr
        .headers()
        .map_err(|e| SourceError::Parse(format!("Failed to read header of {}: {e}", path.display())))?
        .clone();
    if headers.len() < 2 {
        return Err(SourceError::Parse(format!(
            "{} needs a date column and at least one ticker column",
            path.display()
        )));
    }
    let tickers: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut rows = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| {
            SourceError::Parse(format!("{} row {}: {e}", path.display(), line + 1))
        })?;
        let raw_date = record.get(0).unwrap_or_default();
        let date: Date = raw_date.parse().map_err(|e| {
            SourceError::Parse(format!(
                "{} row {}: invalid date {raw_date:?}: {e}",
                path.display(),
                line + 1
            ))
        })?;
        let closes = (1..=tickers.len())
            .map(|i| record.get(i).and_then(parse_close))
            .collect();
        rows.push(PriceRow { date, closes });
    }

    tracing::debug!(
        path = %path.display(),
        tickers = tickers.len(),
        rows = rows.len(),
        "loaded price file"
    );
    Ok(PriceTable::new(tickers, rows)?)
}

/// Prices read from CSV files on disk
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    prices: PathBuf,
    benchmark: Option<PathBuf>,
}

impl CsvPriceSource {
    pub fn new(prices: PathBuf) -> Self {
        Self {
            prices,
            benchmark: None,
        }
    }

    /// Read the benchmark from its own file instead of the main price file
    #[must_use]
    pub fn with_benchmark_file(mut self, path: PathBuf) -> Self {
        self.benchmark = Some(path);
        self
    }
}

impl PriceSource for CsvPriceSource {
    fn available_tickers(&self) -> Result<Vec<String>, SourceError> {
        Ok(read_price_csv(&self.prices)?.tickers().to_vec())
    }

    fn fetch_adjusted_closes(
        &self,
        tickers: &[String],
        start: Option<Date>,
        end: Option<Date>,
    ) -> Result<PriceTable, SourceError> {
        let table = read_price_csv(&self.prices)?.window(start, end);
        Ok(project(&table, tickers)?)
    }

    fn fetch_benchmark_closes(
        &self,
        symbol: &str,
        start: Option<Date>,
        end: Option<Date>,
    ) -> Result<PriceTable, SourceError> {
        let path = self.benchmark.as_deref().unwrap_or(&self.prices);
        let table = read_price_csv(path)?.window(start, end);
        Ok(project(&table, &[symbol.to_string()])?)
    }
}

/// Seeded synthetic market, generated once and served from memory
#[derive(Debug, Clone)]
pub struct SyntheticPriceSource {
    table: PriceTable,
}

impl SyntheticPriceSource {
    pub fn new(market: &SyntheticMarket, seed: u64) -> Result<Self, SourceError> {
        let table = market
            .generate(&mut StdRng::seed_from_u64(seed))
            .map_err(|e| SourceError::Generate(e.to_string()))?;
        Ok(Self { table })
    }

    /// `assets` spread tickers plus a calmer benchmark index named `benchmark`
    pub fn with_benchmark(
        assets: usize,
        trading_days: usize,
        start: Date,
        benchmark: &str,
        seed: u64,
    ) -> Result<Self, SourceError> {
        let mut market = SyntheticMarket::spread("SYN", assets, start, trading_days);
        market.assets.push(SyntheticAsset {
            ticker: benchmark.to_string(),
            daily_mean: 0.0003,
            daily_std: 0.01,
            initial_price: 1_000.0,
        });
        Self::new(&market, seed)
    }
}

impl PriceSource for SyntheticPriceSource {
    fn available_tickers(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.table.tickers().to_vec())
    }

    fn fetch_adjusted_closes(
        &self,
        tickers: &[String],
        start: Option<Date>,
        end: Option<Date>,
    ) -> Result<PriceTable, SourceError> {
        Ok(project(&self.table.clone().window(start, end), tickers)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CLOSES: &str = "\
date,AAA,BBB,IDX
2024-01-02,10.0,20.0,100
2024-01-03,11.0,,101
2024-01-04,12.1,22.0,n/a
2024-01-05,13.31,24.2,103
";

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_price_csv_marks_gaps_missing() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_csv(&temp_dir, "closes.csv", CLOSES);

        let table = read_price_csv(&path).unwrap();
        assert_eq!(table.tickers(), &["AAA", "BBB", "IDX"]);
        assert_eq!(table.len(), 4);
        assert_eq!(table.rows()[1].closes, vec![Some(11.0), None, Some(101.0)]);
        assert_eq!(table.rows()[2].closes[2], None);
    }

    #[test]
    fn test_fetch_projects_and_windows() {
        let temp_dir = TempDir::new().unwrap();
        let source = CsvPriceSource::new(write_csv(&temp_dir, "closes.csv", CLOSES));

        let table = source
            .fetch_adjusted_closes(
                &["BBB".to_string(), "AAA".to_string()],
                Some(jiff::civil::date(2024, 1, 3)),
                Some(jiff::civil::date(2024, 1, 5)),
            )
            .unwrap();
        assert_eq!(table.tickers(), &["BBB", "AAA"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1].closes, vec![Some(22.0), Some(12.1)]);

        let err = source
            .fetch_adjusted_closes(&["ZZZ".to_string()], None, None)
            .unwrap_err();
        assert!(matches!(
            err,
            SourceError::Data(DataError::UnknownTicker(ref t)) if t == "ZZZ"
        ));
    }

    #[test]
    fn test_benchmark_from_separate_file() {
        let temp_dir = TempDir::new().unwrap();
        let prices = write_csv(&temp_dir, "closes.csv", CLOSES);
        let bench = write_csv(
            &temp_dir,
            "index.csv",
            "date,^BVSP\n2024-01-02,120000\n2024-01-03,121000\n",
        );
        let source = CsvPriceSource::new(prices).with_benchmark_file(bench);

        let table = source.fetch_benchmark_closes("^BVSP", None, None).unwrap();
        assert_eq!(table.tickers(), &["^BVSP"]);
        assert_eq!(table.len(), 2);
        assert_eq!(
            source.available_tickers().unwrap(),
            vec!["AAA", "BBB", "IDX"]
        );
    }

    #[test]
    fn test_bad_date_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_csv(&temp_dir, "bad.csv", "date,AAA\nyesterday,1.0\n");
        assert!(matches!(read_price_csv(&path), Err(SourceError::Parse(_))));

        let missing = temp_dir.path().join("missing.csv");
        assert!(matches!(read_price_csv(&missing), Err(SourceError::Io(_))));
    }

    #[test]
    fn test_synthetic_source_serves_benchmark() {
        let source =
            SyntheticPriceSource::with_benchmark(5, 40, jiff::civil::date(2024, 1, 2), "^BVSP", 1)
                .unwrap();
        let tickers = source.available_tickers().unwrap();
        assert_eq!(tickers.len(), 6);
        assert_eq!(tickers.last().map(String::as_str), Some("^BVSP"));

        let bench = source.fetch_benchmark_closes("^BVSP", None, None).unwrap();
        assert_eq!(bench.len(), 40);
        assert!(bench.rows().iter().all(|r| r.closes[0].is_some()));
    }
}
