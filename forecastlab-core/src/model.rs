//! The injected prediction capability.
//!
//! The sequence model lives outside this crate. The pipeline only hands it
//! normalized `[W, 17]` windows and takes back one normalized scalar per
//! window: the next close in the window's own normalized space.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{FeatureRow, FeatureVector, CLOSE_INDEX, FEATURE_DIM};
use crate::error::InputError;
use crate::normalize::{compute_stats, normalize, DimensionStats};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("model error: {0}")]
    Model(String),

    #[error("no prediction available for window ending {0}")]
    Missing(NaiveDate),

    #[error("non-finite prediction {value} for window ending {date}")]
    NonFinite { date: NaiveDate, value: f64 },
}

/// One model input: a window normalized with statistics of that window alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedWindow {
    /// Date of the newest row in the window.
    pub end_date: NaiveDate,
    /// Normalized vectors, oldest first.
    pub vectors: Vec<FeatureVector>,
    /// Statistics that produced `vectors`.
    pub stats: Vec<DimensionStats>,
}

impl NormalizedWindow {
    /// Normalize a dated window with its own statistics.
    pub fn from_rows(rows: &[FeatureRow]) -> Result<Self, InputError> {
        let end_date = rows.last().ok_or(InputError::EmptyMatrix)?.date;
        let raw: Vec<FeatureVector> = rows.iter().map(|r| r.values).collect();
        let stats = compute_stats(&raw)?;
        let vectors = normalize(&raw, &stats)?;
        Ok(Self {
            end_date,
            vectors,
            stats,
        })
    }

    /// `[W, 17]`.
    pub fn shape(&self) -> [usize; 2] {
        [self.vectors.len(), FEATURE_DIM]
    }

    /// Normalized close of the newest row.
    pub fn last_close(&self) -> Option<f64> {
        self.vectors.last().map(FeatureVector::close)
    }

    /// Normalized close column, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.vectors.iter().map(FeatureVector::close).collect()
    }

    /// Map a normalized model output back to a price with the close stats.
    pub fn denormalize_target(&self, value: f64) -> f64 {
        self.stats
            .get(CLOSE_INDEX)
            .map_or(value, |s| s.unscale(value))
    }
}

/// A model that scores one window at a time.
pub trait Predictor: Send + Sync {
    /// Human-readable name, recorded with backtest results.
    fn name(&self) -> &str;

    /// Predict the next normalized close for `window`.
    fn predict(&self, window: &NormalizedWindow) -> Result<f64, PredictError>;
}

/// Adapter turning a closure into a `Predictor`.
pub struct FnPredictor<F> {
    name: String,
    f: F,
}

impl<F> FnPredictor<F>
where
    F: Fn(&NormalizedWindow) -> f64 + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Predictor for FnPredictor<F>
where
    F: Fn(&NormalizedWindow) -> f64 + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, window: &NormalizedWindow) -> Result<f64, PredictError> {
        Ok((self.f)(window))
    }
}
