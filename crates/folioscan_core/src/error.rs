use std::fmt;

/// Errors raised by the return/risk statistics
#[derive(Debug, Clone, PartialEq)]
pub enum StatsError {
    /// Statistic requested on a zero-length series
    EmptySeries,
    /// Sharpe ratio (or another ratio) over a zero denominator
    DivisionByZero { context: &'static str },
    /// Sample statistics need more observations than were provided
    InsufficientObservations { required: usize, available: usize },
    /// Vector/matrix operands disagree on length
    DimensionMismatch { expected: usize, actual: usize },
}

impl fmt::Display for StatsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsError::EmptySeries => write!(f, "return series is empty"),
            StatsError::DivisionByZero { context } => {
                write!(f, "division by zero in {context}")
            }
            StatsError::InsufficientObservations {
                required,
                available,
            } => write!(
                f,
                "need at least {required} observations, got {available}"
            ),
            StatsError::DimensionMismatch { expected, actual } => {
                write!(f, "dimension mismatch: expected {expected}, got {actual}")
            }
        }
    }
}

impl std::error::Error for StatsError {}

/// Errors raised while drawing random subsets or weights
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SamplingError {
    /// Subset larger than the universe it is drawn from
    InsufficientUniverse { requested: usize, available: usize },
    /// Nothing to sample from
    EmptyUniverse,
}

impl fmt::Display for SamplingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplingError::InsufficientUniverse {
                requested,
                available,
            } => write!(
                f,
                "cannot draw {requested} assets from a universe of {available}"
            ),
            SamplingError::EmptyUniverse => write!(f, "asset universe is empty"),
        }
    }
}

impl std::error::Error for SamplingError {}

/// Errors related to the shape and completeness of price data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// Too few complete rows remain after dropping gaps
    DataGap { required: usize, available: usize },
    /// Requested ticker is not a column of the table
    UnknownTicker(String),
    /// Ticker listed twice in a universe or table header
    DuplicateTicker(String),
    /// A price row does not have one cell per ticker
    RowLengthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
    /// Benchmark tables must carry exactly one column
    NotSingleColumn { columns: usize },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::DataGap {
                required,
                available,
            } => write!(
                f,
                "only {available} complete return rows after trimming gaps, need {required}"
            ),
            DataError::UnknownTicker(ticker) => write!(f, "ticker {ticker:?} not in price table"),
            DataError::DuplicateTicker(ticker) => write!(f, "ticker {ticker:?} listed twice"),
            DataError::RowLengthMismatch {
                row,
                expected,
                actual,
            } => write!(f, "row {row} has {actual} cells, expected {expected}"),
            DataError::NotSingleColumn { columns } => {
                write!(f, "expected a single-column table, got {columns} columns")
            }
        }
    }
}

impl std::error::Error for DataError {}

/// Errors that stop an engine before (or instead of) running
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Structural misconfiguration detected before the first iteration
    Config(String),
    Stats(StatsError),
    Sampling(SamplingError),
    Data(DataError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Config(msg) => write!(f, "configuration error: {msg}"),
            EngineError::Stats(e) => write!(f, "{e}"),
            EngineError::Sampling(e) => write!(f, "{e}"),
            EngineError::Data(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Config(_) => None,
            EngineError::Stats(e) => Some(e),
            EngineError::Sampling(e) => Some(e),
            EngineError::Data(e) => Some(e),
        }
    }
}

impl From<StatsError> for EngineError {
    fn from(err: StatsError) -> Self {
        EngineError::Stats(err)
    }
}

impl From<SamplingError> for EngineError {
    fn from(err: SamplingError) -> Self {
        EngineError::Sampling(err)
    }
}

impl From<DataError> for EngineError {
    fn from(err: DataError) -> Self {
        EngineError::Data(err)
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
