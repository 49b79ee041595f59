//! Backtest report records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use forecastlab_core::backtest::{BacktestOutcome, PredictionPoint, Strategy};
use forecastlab_core::domain::{TradeEvent, TradeKind};

use crate::config::RunId;

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Complete record of one prediction-driven backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// BLAKE3 over config id, dataset hash and predictor name.
    pub run_id: RunId,
    pub config_id: RunId,
    pub dataset_hash: String,
    pub symbol: String,
    pub predictor: String,
    pub strategy: Strategy,
    pub recurrence: usize,
    pub start_cash: f64,
    pub end_cash: f64,
    /// `end_cash / start_cash - 1`.
    pub total_return: f64,
    pub trades: Vec<TradeEvent>,
    pub predictions: Vec<PredictionPoint>,
    pub window_count: usize,
    pub test_start: NaiveDate,
    pub test_end: NaiveDate,
    pub final_signal: Option<TradeKind>,
}

/// Identity and range information shared by every report of one run.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub config_id: RunId,
    pub dataset_hash: String,
    pub symbol: String,
    pub predictor: String,
    pub recurrence: usize,
    pub test_start: NaiveDate,
    pub test_end: NaiveDate,
}

impl ReportContext {
    pub fn run_id(&self) -> RunId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.config_id.as_bytes());
        hasher.update(self.dataset_hash.as_bytes());
        hasher.update(self.predictor.as_bytes());
        hasher.finalize().to_hex().to_string()
    }
}

impl BacktestReport {
    pub fn new(ctx: &ReportContext, outcome: BacktestOutcome, predictions: Vec<PredictionPoint>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            run_id: ctx.run_id(),
            config_id: ctx.config_id.clone(),
            dataset_hash: ctx.dataset_hash.clone(),
            symbol: ctx.symbol.clone(),
            predictor: ctx.predictor.clone(),
            strategy: outcome.strategy,
            recurrence: ctx.recurrence,
            start_cash: outcome.portfolio.start_cash,
            end_cash: outcome.end_cash(),
            total_return: outcome.total_return(),
            window_count: outcome.steps,
            trades: outcome.trades,
            predictions,
            test_start: ctx.test_start,
            test_end: ctx.test_end,
            final_signal: outcome.final_signal,
        }
    }

    /// Short id used for artifact directory names: the first 12 characters of
    /// a hex run id, or the whole id when that prefix is not a char boundary.
    pub fn short_id(&self) -> &str {
        self.run_id.get(..12).unwrap_or(&self.run_id)
    }
}

/// The same predictions replayed under every strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyComparison {
    /// One report per strategy, in strategy id order.
    pub reports: Vec<BacktestReport>,
}

impl StrategyComparison {
    /// Reports ordered by end cash, highest first. Ties keep strategy order.
    pub fn ranked(&self) -> Vec<&BacktestReport> {
        let mut ranked: Vec<&BacktestReport> = self.reports.iter().collect();
        ranked.sort_by(|a, b| b.end_cash.total_cmp(&a.end_cash));
        ranked
    }

    pub fn best(&self) -> Option<&BacktestReport> {
        self.ranked().into_iter().next()
    }

    pub fn get(&self, strategy: Strategy) -> Option<&BacktestReport> {
        self.reports.iter().find(|r| r.strategy == strategy)
    }
}
