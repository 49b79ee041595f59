//! Per-dimension z-score normalization.
//!
//! Statistics are computed column by column with the population standard
//! deviation (divide by N). The forward transform divides by `std + EPSILON`
//! so constant columns stay finite, and the inverse multiplies by the same
//! `std + EPSILON`, so a round trip through the same stats is exact up to
//! floating-point error.
//!
//! Stats computed on one slice and applied to another (train stats on test
//! data) deliberately do not round-trip the other slice.

use serde::{Deserialize, Serialize};

use crate::domain::{FeatureVector, FEATURE_DIM};
use crate::error::InputError;

/// Added to every standard deviation before dividing.
pub const EPSILON: f64 = 1e-3;

/// Summary statistics of one feature column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
}

impl DimensionStats {
    /// Statistics of a column. `None` for an empty column.
    pub fn of_column(column: &[f64]) -> Option<Self> {
        if column.is_empty() {
            return None;
        }
        let n = column.len() as f64;
        let mean = column.iter().sum::<f64>() / n;
        let variance = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let (min, max) = column
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        Some(Self {
            min,
            max,
            mean,
            std: variance.sqrt(),
        })
    }

    pub fn scale(&self, value: f64) -> f64 {
        (value - self.mean) / (self.std + EPSILON)
    }

    /// Inverse of `scale`: `value * (std + EPSILON) + mean`.
    pub fn unscale(&self, value: f64) -> f64 {
        value * (self.std + EPSILON) + self.mean
    }
}

/// One `DimensionStats` per column of `matrix`.
pub fn compute_stats<R: AsRef<[f64]>>(matrix: &[R]) -> Result<Vec<DimensionStats>, InputError> {
    let width = matrix.first().ok_or(InputError::EmptyMatrix)?.as_ref().len();
    if width == 0 {
        return Err(InputError::EmptyMatrix);
    }
    for (row, r) in matrix.iter().enumerate() {
        let got = r.as_ref().len();
        if got != width {
            return Err(InputError::RaggedMatrix {
                row,
                expected: width,
                got,
            });
        }
    }

    let mut column = Vec::with_capacity(matrix.len());
    let mut stats = Vec::with_capacity(width);
    for dim in 0..width {
        column.clear();
        column.extend(matrix.iter().map(|r| r.as_ref()[dim]));
        // Non-empty by the checks above.
        if let Some(s) = DimensionStats::of_column(&column) {
            stats.push(s);
        }
    }
    Ok(stats)
}

/// Z-score every value of a feature matrix with the supplied stats.
pub fn normalize(
    matrix: &[FeatureVector],
    stats: &[DimensionStats],
) -> Result<Vec<FeatureVector>, InputError> {
    if stats.len() != FEATURE_DIM {
        return Err(InputError::DimensionMismatch {
            expected: FEATURE_DIM,
            got: stats.len(),
        });
    }
    Ok(matrix
        .iter()
        .map(|v| {
            let mut out = v.0;
            for (value, s) in out.iter_mut().zip(stats) {
                *value = s.scale(*value);
            }
            FeatureVector(out)
        })
        .collect())
}

/// Compute stats from `matrix` itself, then normalize it.
pub fn normalize_fresh(
    matrix: &[FeatureVector],
) -> Result<(Vec<FeatureVector>, Vec<DimensionStats>), InputError> {
    let stats = compute_stats(matrix)?;
    let normalized = normalize(matrix, &stats)?;
    Ok((normalized, stats))
}

/// Map normalized values of one dimension back to its original scale.
///
/// Computes `v * (std + EPSILON) + mean`, not the plain `v * std + mean`. The
/// results are therefore larger by a factor of `(std + EPSILON) / std` than a
/// plain-`std` inverse, which matters only for columns whose `std` is close to
/// `EPSILON`. In exchange, `denormalize(normalize(x))` returns `x`.
pub fn denormalize(values: &[f64], stats: &DimensionStats) -> Vec<f64> {
    values.iter().map(|&v| stats.unscale(v)).collect()
}
