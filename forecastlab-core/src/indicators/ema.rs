//! Exponential Moving Average (EMA).
//!
//! k = 2 / (period + 1). The first value seeds the running average and is not
//! emitted; afterwards EMA[t] = data[t] * k + EMA[t-1] * (1 - k).
//! Output length: `len - 1` regardless of period.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        1
    }

    fn compute(&self, data: &[f64]) -> Vec<f64> {
        ema(self.period, data)
    }
}

/// Smoothing constant for a given period.
pub fn smoothing(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// EMA over a flat series, oldest first.
pub fn ema(period: usize, data: &[f64]) -> Vec<f64> {
    let Some((&seed, rest)) = data.split_first() else {
        return Vec::new();
    };
    if period == 0 {
        return Vec::new();
    }
    let k = smoothing(period);
    let mut prev = seed;
    rest.iter()
        .map(|&value| {
            prev = value * k + prev * (1.0 - k);
            prev
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn ema_3_known_values() {
        // k = 0.5, seed 10
        // 11*0.5 + 10*0.5 = 10.5
        // 12*0.5 + 10.5*0.5 = 11.25
        // 13*0.5 + 11.25*0.5 = 12.125
        let result = ema(3, &[10.0, 11.0, 12.0, 13.0]);
        assert_eq!(result.len(), 3);
        assert_approx(result[0], 10.5, DEFAULT_EPSILON);
        assert_approx(result[1], 11.25, DEFAULT_EPSILON);
        assert_approx(result[2], 12.125, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_first_value_blends_seed() {
        let k = smoothing(10);
        let result = ema(10, &[100.0, 110.0]);
        assert_approx(result[0], 110.0 * k + 100.0 * (1.0 - k), DEFAULT_EPSILON);
    }

    #[test]
    fn ema_period_1_tracks_input() {
        let result = ema(1, &[100.0, 200.0, 300.0]);
        assert_eq!(result, vec![200.0, 300.0]);
    }

    #[test]
    fn ema_short_input_is_empty() {
        assert!(ema(5, &[]).is_empty());
        assert!(ema(5, &[1.0]).is_empty());
    }
}
