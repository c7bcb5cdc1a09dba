//! Momentum oscillator series.
//!
//! - `IndicatorPoint`: one dated oscillator reading, undefined during warm-up
//! - `IndicatorSeries`: readings aligned one-to-one with the price series

pub mod rsi;

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    /// `None` until enough history exists; otherwise in `[0, 100]`.
    pub value: Option<f64>,
}

impl IndicatorPoint {
    pub fn is_defined(&self) -> bool {
        self.value.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub period: usize,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of leading points without a value.
    pub fn warmup_len(&self) -> usize {
        self.values.iter().take_while(|p| !p.is_defined()).count()
    }

    pub fn defined_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(|p| p.value)
    }
}
