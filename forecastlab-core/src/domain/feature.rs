//! FeatureVector: the 17-dimension model input for one bar.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of dimensions in a feature vector.
pub const FEATURE_DIM: usize = 17;

/// Index of the close dimension, which is also the prediction target.
pub const CLOSE_INDEX: usize = 0;

/// Column names in vector order.
pub const FEATURE_NAMES: [&str; FEATURE_DIM] = [
    "close", "open", "high", "low", "volume", "ema_10", "ema_20", "ema_50", "sma_10", "sma_20",
    "sma_50", "sma_100", "rsi_7", "rsi_14", "rsi_28", "stoch_7", "stoch_14",
];

/// Fixed-order feature tuple:
/// `(close, open, high, low, volume, ema10, ema20, ema50, sma10, sma20, sma50, sma100,
/// rsi7, rsi14, rsi28, stoch7, stoch14)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_DIM]);

impl FeatureVector {
    pub fn close(&self) -> f64 {
        self.0[CLOSE_INDEX]
    }

    pub fn get(&self, dimension: usize) -> Option<f64> {
        self.0.get(dimension).copied()
    }

    pub fn values(&self) -> &[f64; FEATURE_DIM] {
        &self.0
    }
}

impl AsRef<[f64]> for FeatureVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl From<[f64; FEATURE_DIM]> for FeatureVector {
    fn from(values: [f64; FEATURE_DIM]) -> Self {
        Self(values)
    }
}

/// A feature vector tagged with the date of the bar it was assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub values: FeatureVector,
}

impl AsRef<[f64]> for FeatureRow {
    fn as_ref(&self) -> &[f64] {
        self.values.as_ref()
    }
}

/// Strip dates from a slice of rows.
pub fn vectors_of(rows: &[FeatureRow]) -> Vec<FeatureVector> {
    rows.iter().map(|r| r.values).collect()
}
