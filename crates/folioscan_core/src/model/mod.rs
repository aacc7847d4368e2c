mod ids;
mod portfolio;
mod results;
mod series;
mod universe;

pub use ids::AssetId;
pub use portfolio::{EqualWeightPortfolio, WeightedPortfolio};
pub use results::{SimulationResult, TerminationReason};
pub use series::{PriceRow, PriceTable, ReturnMatrix, ReturnSeries};
pub use universe::AssetUniverse;
