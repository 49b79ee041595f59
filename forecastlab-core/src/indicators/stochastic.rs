//! Stochastic oscillator %K over a single series.
//!
//! %K = (last - min) / (max - min) * 100 over the trailing `period` values.
//! A flat window (max == min) yields `FLAT_WINDOW_K`.
//! Output length: `len - period + 1`.

use super::Indicator;

/// %K reported when the window has no range.
pub const FLAT_WINDOW_K: f64 = 0.0;

#[derive(Debug, Clone)]
pub struct Stochastic {
    period: usize,
    name: String,
}

impl Stochastic {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "stochastic period must be >= 1");
        Self {
            period,
            name: format!("stoch_{period}"),
        }
    }
}

impl Indicator for Stochastic {
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, data: &[f64]) -> Vec<f64> {
        stochastic(self.period, data)
    }
}

/// Stochastic %K over a flat series, oldest first.
pub fn stochastic(period: usize, data: &[f64]) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return Vec::new();
    }
    data.windows(period)
        .map(|w| {
            let last = w[w.len() - 1];
            let (lo, hi) = w
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                });
            if hi == lo {
                FLAT_WINDOW_K
            } else {
                (last - lo) / (hi - lo) * 100.0
            }
        })
        .collect()
}
