//! Relative Strength Index (RSI).
//!
//! For each index i >= period, look at the trailing `period + 1` values and
//! average the positive and the absolute negative bar-to-bar differences. Each
//! average divides by the number of moves of that sign, not by `period`.
//! RS = avg_gain / avg_loss (0 when avg_loss is 0).
//! RSI = 100 when RS is 0, else 100 - 100 / (1 + RS).
//! Output length: `len - period`.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        self.period
    }

    fn compute(&self, data: &[f64]) -> Vec<f64> {
        rsi(self.period, data)
    }
}

/// RSI over a flat series, oldest first.
pub fn rsi(period: usize, data: &[f64]) -> Vec<f64> {
    if period == 0 || data.len() <= period {
        return Vec::new();
    }
    data.windows(period + 1).map(window_rsi).collect()
}

fn window_rsi(window: &[f64]) -> f64 {
    let (mut gain_total, mut gain_count) = (0.0, 0usize);
    let (mut loss_total, mut loss_count) = (0.0, 0usize);

    for pair in window.windows(2) {
        let diff = pair[1] - pair[0];
        if diff > 0.0 {
            gain_total += diff;
            gain_count += 1;
        } else if diff < 0.0 {
            loss_total += -diff;
            loss_count += 1;
        }
    }

    let avg_gain = if gain_count > 0 {
        gain_total / gain_count as f64
    } else {
        0.0
    };
    let avg_loss = if loss_count > 0 {
        loss_total / loss_count as f64
    } else {
        0.0
    };

    let rs = if avg_loss > 0.0 { avg_gain / avg_loss } else { 0.0 };
    if rs == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + rs)
    }
}
