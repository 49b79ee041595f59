//! Signal rules that turn a prediction into a buy/sell signal.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::TradeKind;
use crate::error::InputError;

/// Selectable signal rule, configured as 1, 2 or 3.
///
/// | strategy | buy | sell |
/// |---|---|---|
/// | 1 conservative | change > 0 and prediction > price | change < 0 and prediction < price |
/// | 2 momentum | change > 0 | change < 0 |
/// | 3 classic | prediction > price | prediction < price |
///
/// `change` is the relative change between consecutive predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Strategy {
    Conservative = 1,
    #[default]
    Momentum = 2,
    Classic = 3,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Conservative, Strategy::Momentum, Strategy::Classic];

    pub fn id(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Conservative => "conservative",
            Strategy::Momentum => "momentum",
            Strategy::Classic => "classic",
        }
    }

    /// Derive the signal for one step.
    ///
    /// When both rules hold (only possible with degenerate inputs) sell wins.
    /// NaN changes satisfy neither rule.
    pub fn signal(
        &self,
        predicted_change: f64,
        prediction: f64,
        realized_price: f64,
    ) -> Option<TradeKind> {
        let (buy, sell) = match self {
            Strategy::Conservative => (
                predicted_change > 0.0 && prediction > realized_price,
                predicted_change < 0.0 && prediction < realized_price,
            ),
            Strategy::Momentum => (predicted_change > 0.0, predicted_change < 0.0),
            Strategy::Classic => (prediction > realized_price, prediction < realized_price),
        };
        if sell {
            Some(TradeKind::Sell)
        } else if buy {
            Some(TradeKind::Buy)
        } else {
            None
        }
    }
}

impl TryFrom<u8> for Strategy {
    type Error = InputError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Strategy::Conservative),
            2 => Ok(Strategy::Momentum),
            3 => Ok(Strategy::Classic),
            other => Err(InputError::InvalidStrategy(other)),
        }
    }
}

impl From<Strategy> for u8 {
    fn from(strategy: Strategy) -> Self {
        strategy.id()
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id(), self.name())
    }
}
