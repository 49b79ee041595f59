//! PriceBar: one daily OHLCV observation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Daily OHLCV bar for the traded instrument.
///
/// Bars are immutable once ingested. A series is identified by `date` and must be
/// strictly ascending with no duplicates before feature computation begins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Returns true if every price is finite, the close is positive and the volume
    /// is non-negative.
    pub fn is_sane(&self) -> bool {
        let finite = [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite());
        finite && self.close > 0.0 && self.volume >= 0.0
    }
}

/// Check that `bars` is strictly ascending by date.
///
/// Reports the first offending bar as a duplicate or an out-of-order date.
pub fn check_ascending(bars: &[PriceBar]) -> Result<(), InputError> {
    match bars.windows(2).find(|pair| pair[1].date <= pair[0].date) {
        Some(pair) if pair[1].date == pair[0].date => Err(InputError::DuplicateDate(pair[1].date)),
        Some(pair) => Err(InputError::Unordered(pair[1].date)),
        None => Ok(()),
    }
}

/// Extract the close column, oldest first.
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
