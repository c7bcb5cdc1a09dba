//! Portfolio state and equity tracking for one simulation run.

use chrono::NaiveDate;
use serde::Serialize;

use super::position::{Position, Trade};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub initial_capital: f64,
    pub position: Position,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    /// Position as it stood at the close of each date in `equity_curve`.
    pub history: Vec<Position>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            initial_capital,
            position: Position::new(initial_capital),
            trades: Vec::new(),
            equity_curve: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn record_trade(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    /// Mark the current position to `price` and append it to the curve.
    pub fn record_equity(&mut self, date: NaiveDate, price: f64) {
        self.equity_curve.push(EquityPoint {
            date,
            equity: self.position.equity(price),
        });
        self.history.push(self.position);
    }

    pub fn fees_paid(&self) -> f64 {
        self.trades.iter().map(|t| t.fee_paid).sum()
    }

    pub fn final_equity(&self) -> f64 {
        self.equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(self.initial_capital)
    }
}
