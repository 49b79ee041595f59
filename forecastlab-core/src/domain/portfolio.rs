//! PortfolioState: start and end cash of one backtest run.

use serde::{Deserialize, Serialize};

/// Starting cash used when none is configured.
pub const DEFAULT_START_CASH: f64 = 1000.0;

/// Cash position summary, reset at the start of every backtest run.
///
/// `end_cash` stays unset until the simulator has force-closed its last leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    pub start_cash: f64,
    pub end_cash: Option<f64>,
}

impl PortfolioState {
    pub fn new(start_cash: f64) -> Self {
        Self {
            start_cash,
            end_cash: None,
        }
    }

    /// Compounded return as a fraction of start cash (0.0 while unfinished).
    pub fn total_return(&self) -> f64 {
        match self.end_cash {
            Some(end) if self.start_cash != 0.0 => end / self.start_cash - 1.0,
            _ => 0.0,
        }
    }
}

impl Default for PortfolioState {
    fn default() -> Self {
        Self::new(DEFAULT_START_CASH)
    }
}
