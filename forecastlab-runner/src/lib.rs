//! ForecastLab Runner: pipeline orchestration around the core.
//!
//! This crate builds on `forecastlab-core` to provide:
//! - TOML pipeline configuration with content-addressed run ids
//! - Bar loading from upstream JSON payloads, CSV and Parquet files
//! - Training/validation datasets and seeded batching for an external model
//! - Predictors usable without a trained model
//! - Prediction-driven backtest runs and strategy comparison
//! - Schema-versioned reports and artifact export

pub mod config;
pub mod data_loader;
pub mod dataset;
pub mod export;
pub mod predictors;
pub mod result;
pub mod runner;
pub mod training_log;

pub use config::{ConfigError, PipelineConfig, RunId, SplitConfig, TrainingConfig};
pub use data_loader::{load_bars, BarFormat, LoadError, LoadedBars};
pub use dataset::{make_dataset, preview, DatasetPreview, TrainingPair, TrainingSet};
pub use export::{load_artifacts, save_artifacts, write_training_set, ExportError};
pub use predictors::{PersistencePredictor, PredictionTable, TrendPredictor};
pub use result::{BacktestReport, StrategyComparison, SCHEMA_VERSION};
pub use runner::{compare_strategies, prepare_features, run_backtest, RunError};
pub use training_log::{EpochLoss, TrainingLog};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<PipelineConfig>();
        assert_sync::<PipelineConfig>();
    }

    #[test]
    fn loaded_bars_is_send_sync() {
        assert_send::<LoadedBars>();
        assert_sync::<LoadedBars>();
    }

    #[test]
    fn training_set_is_send_sync() {
        assert_send::<TrainingSet>();
        assert_sync::<TrainingSet>();
    }

    #[test]
    fn predictors_are_send_sync() {
        assert_send::<PersistencePredictor>();
        assert_sync::<PersistencePredictor>();
        assert_send::<TrendPredictor>();
        assert_sync::<TrendPredictor>();
        assert_send::<PredictionTable>();
        assert_sync::<PredictionTable>();
    }

    #[test]
    fn reports_are_send_sync() {
        assert_send::<BacktestReport>();
        assert_sync::<BacktestReport>();
        assert_send::<StrategyComparison>();
        assert_sync::<StrategyComparison>();
    }
}
