//! Domain types for ForecastLab

pub mod bar;
pub mod feature;
pub mod portfolio;
pub mod trade;

pub use bar::PriceBar;
pub use feature::{vectors_of, FeatureRow, FeatureVector, CLOSE_INDEX, FEATURE_DIM, FEATURE_NAMES};
pub use portfolio::{PortfolioState, DEFAULT_START_CASH};
pub use trade::{TradeEvent, TradeKind};
