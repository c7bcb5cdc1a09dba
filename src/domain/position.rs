//! Position state and the trade log.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use super::signal::Signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Long,
}

impl PositionState {
    /// The trade needed to move from this state to the desired one, if any.
    pub fn transition(self, desired: Signal) -> Option<TradeDirection> {
        match (self, desired) {
            (PositionState::Flat, Signal::HoldLong) => Some(TradeDirection::Buy),
            (PositionState::Long, Signal::HoldCash) => Some(TradeDirection::Sell),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeDirection {
    Buy,
    Sell,
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeDirection::Buy => write!(f, "BUY"),
            TradeDirection::Sell => write!(f, "SELL"),
        }
    }
}

/// Cash/share holdings during a simulation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub cash: f64,
    pub shares: f64,
    pub state: PositionState,
}

impl Position {
    pub fn new(initial_capital: f64) -> Self {
        Position {
            cash: initial_capital,
            shares: 0.0,
            state: PositionState::Flat,
        }
    }

    pub fn is_long(&self) -> bool {
        self.state == PositionState::Long
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.shares * price
    }

    /// cash + shares * price
    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.market_value(price)
    }
}

/// A realized position change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub date: NaiveDate,
    pub direction: TradeDirection,
    pub price: f64,
    pub shares: f64,
    pub fee_paid: f64,
}
