//! Indicator engine.
//!
//! Every indicator is a pure function over a flat close series (oldest first).
//! Leading values without a full lookback are dropped rather than NaN-padded,
//! so each output series is aligned with a suffix of the input. Input shorter
//! than the lookback yields an empty series.

pub mod ema;
pub mod rsi;
pub mod seasonality;
pub mod sma;
pub mod stochastic;

pub use ema::{ema, Ema};
pub use rsi::{rsi, Rsi};
pub use seasonality::{seasonality, Harmonic};
pub use sma::{sma, Sma};
pub use stochastic::{stochastic, Stochastic, FLAT_WINDOW_K};

/// Trait for suffix-aligned indicators.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading input values that produce no output.
    fn warmup(&self) -> usize;

    /// Compute the indicator; output length is `len - warmup()` (or 0).
    fn compute(&self, data: &[f64]) -> Vec<f64>;
}

/// The twelve indicators of the feature vector, in vector order.
pub fn feature_indicators() -> Vec<Box<dyn Indicator>> {
    vec![
        Box::new(Ema::new(10)),
        Box::new(Ema::new(20)),
        Box::new(Ema::new(50)),
        Box::new(Sma::new(10)),
        Box::new(Sma::new(20)),
        Box::new(Sma::new(50)),
        Box::new(Sma::new(100)),
        Box::new(Rsi::new(7)),
        Box::new(Rsi::new(14)),
        Box::new(Rsi::new(28)),
        Box::new(Stochastic::new(7)),
        Box::new(Stochastic::new(14)),
    ]
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
