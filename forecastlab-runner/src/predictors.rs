//! Predictors usable without a trained sequence model.
//!
//! All three work in the window's normalized space, like a trained model:
//! they return the next normalized close and the backtest denormalizes it.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use forecastlab_core::data::parse_date;
use forecastlab_core::model::{NormalizedWindow, PredictError, Predictor};
use forecastlab_core::InputError;

use crate::data_loader::LoadError;

/// Next close equals the last close.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersistencePredictor;

impl Predictor for PersistencePredictor {
    fn name(&self) -> &str {
        "persistence"
    }

    fn predict(&self, window: &NormalizedWindow) -> Result<f64, PredictError> {
        window
            .last_close()
            .ok_or(PredictError::Missing(window.end_date))
    }
}

/// Least-squares line through the last `lookback` closes, extended one step.
#[derive(Debug, Clone)]
pub struct TrendPredictor {
    lookback: usize,
    name: String,
}

impl TrendPredictor {
    /// `lookback` below 2 is raised to 2.
    pub fn new(lookback: usize) -> Self {
        let lookback = lookback.max(2);
        Self {
            lookback,
            name: format!("trend_{lookback}"),
        }
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }
}

impl Default for TrendPredictor {
    fn default() -> Self {
        Self::new(5)
    }
}

impl Predictor for TrendPredictor {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, window: &NormalizedWindow) -> Result<f64, PredictError> {
        let closes = window.closes();
        let tail = &closes[closes.len().saturating_sub(self.lookback)..];
        match tail {
            [] => Err(PredictError::Missing(window.end_date)),
            [only] => Ok(*only),
            _ => Ok(extrapolate(tail)),
        }
    }
}

/// Value of the fitted line at `x = len`.
fn extrapolate(ys: &[f64]) -> f64 {
    let n = ys.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = ys.iter().sum::<f64>() / n;
    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (i, y) in ys.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxy += dx * (y - mean_y);
        sxx += dx * dx;
    }
    let slope = sxy / sxx;
    mean_y + slope * (n - mean_x)
}

/// Precomputed normalized model outputs keyed by window end date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionTable {
    values: BTreeMap<NaiveDate, f64>,
}

#[derive(Debug, Deserialize)]
struct TableRow {
    date: String,
    prediction: f64,
}

impl PredictionTable {
    /// Build from `(end date, normalized prediction)` pairs. Dates must be unique.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Result<Self, InputError> {
        let mut values = BTreeMap::new();
        for (date, prediction) in pairs {
            if values.insert(date, prediction).is_some() {
                return Err(InputError::DuplicateDate(date));
            }
        }
        Ok(Self { values })
    }

    /// Load a `date,prediction` CSV.
    pub fn from_csv(path: &Path) -> Result<Self, LoadError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut pairs = Vec::new();
        for record in reader.deserialize::<TableRow>() {
            let row = record?;
            pairs.push((parse_date(&row.date)?, row.prediction));
        }
        Ok(Self::from_pairs(pairs)?)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.values.get(&date).copied()
    }
}

impl Predictor for PredictionTable {
    fn name(&self) -> &str {
        "table"
    }

    fn predict(&self, window: &NormalizedWindow) -> Result<f64, PredictError> {
        self.get(window.end_date)
            .ok_or(PredictError::Missing(window.end_date))
    }
}
