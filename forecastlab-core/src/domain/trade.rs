//! TradeEvent: a signal transition recorded by the backtest simulator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a signal transition.
///
/// Only long exposure is modeled; `Sell` means holding no position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    Buy,
    Sell,
}

impl TradeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeKind::Buy => "buy",
            TradeKind::Sell => "sell",
        }
    }
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the trade log, used for chart annotations.
///
/// Emitted only when the held signal changes, never on every bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub timestamp: NaiveDate,
    pub kind: TradeKind,
    pub label: String,
    /// Realized price at the transition.
    pub price: f64,
    /// Running cash value after compounding the closed leg.
    pub cash: f64,
}

impl TradeEvent {
    pub fn new(timestamp: NaiveDate, kind: TradeKind, price: f64, cash: f64) -> Self {
        Self {
            timestamp,
            kind,
            label: format!("Investing ${} at {}", cash.round(), price),
            price,
            cash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_rounds_cash() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let event = TradeEvent::new(date, TradeKind::Buy, 101.25, 1049.6);
        assert_eq!(event.label, "Investing $1050 at 101.25");
        assert_eq!(event.kind.to_string(), "buy");
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&TradeKind::Sell).unwrap();
        assert_eq!(json, "\"sell\"");
    }
}
