//! Simple Moving Average (SMA).
//!
//! Arithmetic mean of the trailing `period` values.
//! Output length: `len - period + 1`; leading indices are dropped, not padded.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, data: &[f64]) -> Vec<f64> {
        sma(self.period, data)
    }
}

/// SMA over a flat series, oldest first.
pub fn sma(period: usize, data: &[f64]) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return Vec::new();
    }
    data.windows(period)
        .map(|w| w.iter().sum::<f64>() / period as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn sma_5_basic() {
        let result = sma(5, &[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]);
        assert_eq!(result.len(), 3);
        // mean(10..=14) = 12, then 13, 14
        assert_approx(result[0], 12.0, DEFAULT_EPSILON);
        assert_approx(result[1], 13.0, DEFAULT_EPSILON);
        assert_approx(result[2], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_identity() {
        assert_eq!(sma(1, &[100.0, 200.0, 300.0]), vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn sma_too_few_values_is_empty() {
        assert!(sma(5, &[10.0, 11.0]).is_empty());
        assert!(sma(0, &[10.0, 11.0]).is_empty());
    }

    #[test]
    fn sma_indicator_warmup() {
        assert_eq!(Sma::new(20).warmup(), 19);
        assert_eq!(Sma::new(1).warmup(), 0);
        assert_eq!(Sma::new(10).name(), "sma_10");
    }
}
