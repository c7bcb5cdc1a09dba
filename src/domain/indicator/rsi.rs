//! RSI (Relative Strength Index) oscillator.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over the first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0 and avg_gain > 0: RSI = 100
//! If both are 0 (flat prices): RSI = 50
//!
//! Warmup: the first n points are undefined (n price changes are needed to
//! seed the averages).

use crate::domain::error::BacktestError;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries};
use crate::domain::price::PricePoint;

pub const DEFAULT_PERIOD: usize = 14;

/// Minimum number of price points for `period` to yield one defined value.
pub fn minimum_points(period: usize) -> usize {
    period.saturating_add(1)
}

pub fn calculate_rsi(prices: &[PricePoint], period: usize) -> Result<IndicatorSeries, BacktestError> {
    if period == 0 {
        return Err(BacktestError::invalid("period must be a positive integer"));
    }
    if prices.len() <= period {
        return Err(BacktestError::InsufficientData {
            bars: prices.len(),
            minimum: minimum_points(period),
        });
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = prices
        .windows(2)
        .map(|w| {
            let change = w[1].close - w[0].close;
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();

    let mut values = Vec::with_capacity(prices.len());
    values.extend(prices[..period].iter().map(|p| IndicatorPoint {
        date: p.date,
        value: None,
    }));

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;
    values.push(IndicatorPoint {
        date: prices[period].date,
        value: Some(oscillator(avg_gain, avg_loss)),
    });

    let smoothing = (period - 1) as f64;
    for (i, point) in prices.iter().enumerate().skip(period + 1) {
        let change_idx = i - 1;
        avg_gain = (avg_gain * smoothing + gains[change_idx]) / period as f64;
        avg_loss = (avg_loss * smoothing + losses[change_idx]) / period as f64;
        values.push(IndicatorPoint {
            date: point.date,
            value: Some(oscillator(avg_gain, avg_loss)),
        });
    }

    Ok(IndicatorSeries { period, values })
}

fn oscillator(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { 50.0 } else { 100.0 }
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
