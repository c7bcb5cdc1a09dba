//! Daily price data: raw OHLCV bars and the close-price series the
//! pipeline runs on.

use chrono::NaiveDate;

use super::error::BacktestError;

/// One daily bar as supplied by a [`DataPort`](crate::ports::data_port::DataPort).
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// An ordered close-price series.
///
/// Dates are strictly increasing and every close is positive and finite;
/// both are checked on construction so downstream stages can index freely.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, BacktestError> {
        for (i, point) in points.iter().enumerate() {
            if !point.close.is_finite() || point.close <= 0.0 {
                return Err(BacktestError::InvalidPriceSeries {
                    reason: format!("close on {} must be positive, got {}", point.date, point.close),
                });
            }
            if i > 0 && point.date <= points[i - 1].date {
                return Err(BacktestError::InvalidPriceSeries {
                    reason: format!(
                        "dates must be strictly increasing: {} follows {}",
                        point.date,
                        points[i - 1].date
                    ),
                });
            }
        }
        Ok(Self { points })
    }

    pub fn from_bars(bars: &[OhlcvBar]) -> Result<Self, BacktestError> {
        Self::new(
            bars.iter()
                .map(|b| PricePoint {
                    date: b.date,
                    close: b.close,
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}
