//! Threshold signal generation.
//!
//! A two-state hysteresis machine over the oscillator: while in cash, a
//! reading below the oversold level moves to long; while long, a reading
//! above the overbought level moves back to cash. Any other reading, and
//! every undefined warm-up point, keeps the current state.

use std::fmt;

use crate::domain::error::BacktestError;
use crate::domain::indicator::IndicatorSeries;

/// Desired position state for a date (a level, not an event).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Signal {
    #[default]
    HoldCash,
    HoldLong,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::HoldCash => write!(f, "HOLD_CASH"),
            Signal::HoldLong => write!(f, "HOLD_LONG"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub overbought: f64,
    pub oversold: f64,
}

impl Thresholds {
    pub fn new(overbought: f64, oversold: f64) -> Result<Self, BacktestError> {
        if !(0.0..=100.0).contains(&oversold) || !(0.0..=100.0).contains(&overbought) {
            return Err(BacktestError::invalid(format!(
                "thresholds must lie in [0, 100], got oversold {} and overbought {}",
                oversold, overbought
            )));
        }
        if oversold >= overbought {
            return Err(BacktestError::invalid(format!(
                "oversold threshold {} must be below overbought threshold {}",
                oversold, overbought
            )));
        }
        Ok(Self {
            overbought,
            oversold,
        })
    }

    /// Next state given the current one and an oscillator reading.
    pub fn next(&self, current: Signal, reading: Option<f64>) -> Signal {
        match (current, reading) {
            (Signal::HoldCash, Some(v)) if v < self.oversold => Signal::HoldLong,
            (Signal::HoldLong, Some(v)) if v > self.overbought => Signal::HoldCash,
            (state, _) => state,
        }
    }
}

/// One signal per indicator point, starting from [`Signal::HoldCash`].
pub fn generate_signals(indicator: &IndicatorSeries, thresholds: &Thresholds) -> Vec<Signal> {
    indicator
        .values
        .iter()
        .scan(Signal::HoldCash, |state, point| {
            *state = thresholds.next(*state, point.value);
            Some(*state)
        })
        .collect()
}
