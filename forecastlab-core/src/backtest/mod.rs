//! Backtest of model predictions over the test range.
//!
//! `predict_steps` drives the injected predictor once per window, in order,
//! and produces the simulator inputs plus the predicted-value series.
//! `simulate` replays those steps under one strategy. Steps are plain values,
//! so one prediction pass can be replayed under every strategy.

pub mod simulator;
pub mod strategy;

pub use simulator::{simulate, BacktestOutcome, BacktestSimulator, BacktestStep};
pub use strategy::Strategy;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::FeatureRow;
use crate::error::InputError;
use crate::model::{NormalizedWindow, PredictError, Predictor};
use crate::windows::build_windows;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BacktestError {
    #[error("input error: {0}")]
    Input(#[from] InputError),
    #[error("prediction error: {0}")]
    Predict(#[from] PredictError),
}

/// A denormalized prediction placed on the date it forecasts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Output of one prediction pass over a range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRun {
    pub steps: Vec<BacktestStep>,
    pub points: Vec<PredictionPoint>,
}

/// Predict every window of `rows`, strictly in chronological order.
///
/// Each window is normalized with its own statistics and the model output is
/// denormalized with that window's close stats. The realized price of a step
/// is the raw close of the window's newest row. A prediction is dated at the
/// next window's end date, or the day after the last window's end date.
pub fn predict_steps(
    rows: &[FeatureRow],
    recurrence: usize,
    predictor: &dyn Predictor,
) -> Result<PredictionRun, BacktestError> {
    let windows = build_windows(rows, recurrence)?;
    let mut steps = Vec::with_capacity(windows.len());
    let mut points = Vec::with_capacity(windows.len());

    for (i, window) in windows.iter().enumerate() {
        let normalized = NormalizedWindow::from_rows(window)?;
        let raw = predictor.predict(&normalized)?;
        let prediction = normalized.denormalize_target(raw);
        if !prediction.is_finite() {
            return Err(PredictError::NonFinite {
                date: normalized.end_date,
                value: prediction,
            }
            .into());
        }

        let target_date = match windows.get(i + 1).and_then(|next| next.last()) {
            Some(next) => next.date,
            None => normalized.end_date + Duration::days(1),
        };

        steps.push(BacktestStep {
            date: normalized.end_date,
            prediction,
            realized_price: window[window.len() - 1].values.close(),
        });
        points.push(PredictionPoint {
            date: target_date,
            value: prediction,
        });
    }

    Ok(PredictionRun { steps, points })
}
