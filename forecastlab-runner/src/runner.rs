//! Backtest runner: wires loaded bars, features, the predictor and the simulator.
//!
//! Two entry points:
//! - `run_backtest()`: one strategy, the one the config names.
//! - `compare_strategies()`: predictions computed once over the test range,
//!   then replayed under every strategy in parallel.

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use forecastlab_core::backtest::{predict_steps, simulate, BacktestError, PredictionRun, Strategy};
use forecastlab_core::domain::FeatureRow;
use forecastlab_core::features::build_feature_rows;
use forecastlab_core::model::Predictor;
use forecastlab_core::windows::select_range;
use forecastlab_core::InputError;

use crate::config::{ConfigError, PipelineConfig};
use crate::data_loader::LoadedBars;
use crate::result::{BacktestReport, ReportContext, StrategyComparison};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("input error: {0}")]
    Input(#[from] InputError),
    #[error("backtest error: {0}")]
    Backtest(#[from] BacktestError),
    #[error("test range [{lo}, {hi}] selects no feature rows")]
    EmptyTestRange { lo: f64, hi: f64 },
}

/// Build feature rows for loaded bars.
pub fn prepare_features(data: &LoadedBars) -> Result<Vec<FeatureRow>, RunError> {
    let rows = build_feature_rows(&data.bars)?;
    info!(
        symbol = %data.symbol,
        bars = data.bars.len(),
        rows = rows.len(),
        "features built"
    );
    Ok(rows)
}

/// Predictions over the configured test range, shared by every strategy.
struct TestRun<'a> {
    rows: &'a [FeatureRow],
    run: PredictionRun,
}

fn predict_test_range<'a>(
    config: &PipelineConfig,
    rows: &'a [FeatureRow],
    predictor: &dyn Predictor,
) -> Result<TestRun<'a>, RunError> {
    let range = config.splits.test_range();
    let test = select_range(rows, range.lo, range.hi)?;
    info!(
        lo = range.lo,
        hi = range.hi,
        rows = test.len(),
        "test range selected"
    );
    let run = predict_steps(test, config.recurrence, predictor)?;
    info!(
        windows = run.steps.len(),
        recurrence = config.recurrence,
        predictor = predictor.name(),
        "windows predicted"
    );
    Ok(TestRun { rows: test, run })
}

fn context(
    config: &PipelineConfig,
    data: &LoadedBars,
    test: &TestRun<'_>,
    predictor: &dyn Predictor,
) -> Result<ReportContext, RunError> {
    let (test_start, test_end) = match (test.rows.first(), test.rows.last()) {
        (Some(first), Some(last)) => (first.date, last.date),
        _ => {
            let range = config.splits.test_range();
            return Err(RunError::EmptyTestRange {
                lo: range.lo,
                hi: range.hi,
            });
        }
    };
    Ok(ReportContext {
        config_id: config.run_id()?,
        dataset_hash: data.dataset_hash.clone(),
        symbol: data.symbol.clone(),
        predictor: predictor.name().to_string(),
        recurrence: config.recurrence,
        test_start,
        test_end,
    })
}

/// Run one prediction-driven backtest over the test range.
pub fn run_backtest(
    config: &PipelineConfig,
    data: &LoadedBars,
    predictor: &dyn Predictor,
) -> Result<BacktestReport, RunError> {
    config.validate()?;
    let strategy = config.strategy()?;
    let rows = prepare_features(data)?;
    let test = predict_test_range(config, &rows, predictor)?;
    let ctx = context(config, data, &test, predictor)?;

    let outcome = simulate(strategy, config.start_cash, &test.run.steps);
    let report = BacktestReport::new(&ctx, outcome, test.run.points);
    info!(
        strategy = %strategy,
        trades = report.trades.len(),
        end_cash = report.end_cash,
        total_return = report.total_return,
        "backtest finished"
    );
    Ok(report)
}

/// Replay one prediction pass under every strategy.
///
/// The config's own `strategy` is ignored; each report's config id is that of
/// the config with its strategy swapped in.
pub fn compare_strategies(
    config: &PipelineConfig,
    data: &LoadedBars,
    predictor: &dyn Predictor,
) -> Result<StrategyComparison, RunError> {
    config.validate()?;
    let rows = prepare_features(data)?;
    let test = predict_test_range(config, &rows, predictor)?;

    let contexts = Strategy::ALL
        .iter()
        .map(|&strategy| {
            let variant = PipelineConfig {
                strategy: strategy.id(),
                ..config.clone()
            };
            context(&variant, data, &test, predictor).map(|ctx| (strategy, ctx))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let reports: Vec<BacktestReport> = contexts
        .par_iter()
        .map(|(strategy, ctx)| {
            let outcome = simulate(*strategy, config.start_cash, &test.run.steps);
            debug!(strategy = %strategy, end_cash = outcome.end_cash(), "strategy replayed");
            BacktestReport::new(ctx, outcome, test.run.points.clone())
        })
        .collect();

    let comparison = StrategyComparison { reports };
    if let Some(best) = comparison.best() {
        info!(
            best = %best.strategy,
            end_cash = best.end_cash,
            "strategy comparison finished"
        );
    }
    Ok(comparison)
}
