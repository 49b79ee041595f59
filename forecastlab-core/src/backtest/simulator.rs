//! Prediction-driven long/flat backtest.
//!
//! State machine over `(date, prediction, realized price)` steps in strict
//! chronological order. The first step only seeds the previous prediction.
//! A trade is recorded only when the derived signal differs from the held one.
//!
//! On each transition the leg since the previous transition is compounded:
//! a held `Buy` multiplies cash by `1 + r`, a held `Sell` by `1 - r`, where
//! `r` is the price change since the reference price. Holding `Sell` is thus an
//! inverse bet, not an economically flat position. After the last step the open
//! leg is force-closed the same way, without a trade event.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::strategy::Strategy;
use crate::domain::{PortfolioState, TradeEvent, TradeKind};

/// One simulator input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestStep {
    /// Date of the newest bar of the window.
    pub date: NaiveDate,
    /// Denormalized model prediction for the next close.
    pub prediction: f64,
    /// Actual close of the newest bar of the window.
    pub realized_price: f64,
}

/// Result of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestOutcome {
    pub strategy: Strategy,
    pub portfolio: PortfolioState,
    pub trades: Vec<TradeEvent>,
    pub steps: usize,
    /// Signal held when the run ended.
    pub final_signal: Option<TradeKind>,
}

impl BacktestOutcome {
    pub fn end_cash(&self) -> f64 {
        self.portfolio.end_cash.unwrap_or(self.portfolio.start_cash)
    }

    pub fn total_return(&self) -> f64 {
        self.portfolio.total_return()
    }
}

#[derive(Debug, Clone)]
pub struct BacktestSimulator {
    strategy: Strategy,
    portfolio: PortfolioState,
    cash: f64,
    held: Option<TradeKind>,
    reference_price: Option<f64>,
    prev_prediction: Option<f64>,
    last_price: Option<f64>,
    trades: Vec<TradeEvent>,
    steps: usize,
}

impl BacktestSimulator {
    pub fn new(strategy: Strategy, start_cash: f64) -> Self {
        Self {
            strategy,
            portfolio: PortfolioState::new(start_cash),
            cash: start_cash,
            held: None,
            reference_price: None,
            prev_prediction: None,
            last_price: None,
            trades: Vec::new(),
            steps: 0,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn held(&self) -> Option<TradeKind> {
        self.held
    }

    pub fn reference_price(&self) -> Option<f64> {
        self.reference_price
    }

    pub fn trades(&self) -> &[TradeEvent] {
        &self.trades
    }

    /// Process the next step. Returns the trade event if the signal changed.
    pub fn step(&mut self, step: &BacktestStep) -> Option<&TradeEvent> {
        self.steps += 1;
        self.last_price = Some(step.realized_price);

        let prev = self.prev_prediction.replace(step.prediction)?;
        let predicted_change = (step.prediction - prev) / prev;
        let signal = self
            .strategy
            .signal(predicted_change, step.prediction, step.realized_price)?;
        if self.held == Some(signal) {
            return None;
        }

        self.compound(step.realized_price);
        self.reference_price = Some(step.realized_price);
        self.held = Some(signal);

        let event = TradeEvent::new(step.date, signal, step.realized_price, self.cash);
        debug!(
            date = %step.date,
            kind = %signal,
            price = step.realized_price,
            cash = self.cash,
            "signal transition"
        );
        self.trades.push(event);
        self.trades.last()
    }

    /// Force-close the open leg and publish the outcome.
    pub fn finish(mut self) -> BacktestOutcome {
        if let Some(last) = self.last_price {
            self.compound(last);
        }
        self.portfolio.end_cash = Some(self.cash);
        BacktestOutcome {
            strategy: self.strategy,
            portfolio: self.portfolio,
            trades: self.trades,
            steps: self.steps,
            final_signal: self.held,
        }
    }

    /// Apply the return since the reference price to cash under the held signal.
    /// No-op before the first transition.
    fn compound(&mut self, price: f64) {
        let (Some(reference), Some(held)) = (self.reference_price, self.held) else {
            return;
        };
        let realized_return = (price - reference) / reference;
        match held {
            TradeKind::Buy => self.cash *= 1.0 + realized_return,
            TradeKind::Sell => self.cash *= 1.0 - realized_return,
        }
    }
}

/// Run a full simulation over `steps`.
pub fn simulate<'a>(
    strategy: Strategy,
    start_cash: f64,
    steps: impl IntoIterator<Item = &'a BacktestStep>,
) -> BacktestOutcome {
    let mut sim = BacktestSimulator::new(strategy, start_cash);
    for step in steps {
        sim.step(step);
    }
    sim.finish()
}
