//! Backtest pipeline.
//!
//! `run_backtest` validates parameters, then runs indicator → signals →
//! trade simulation → metrics, with the buy-and-hold baseline computed off
//! the same prices. Nothing here performs I/O.

use super::baseline::buy_and_hold;
use super::error::BacktestError;
use super::execution::simulate;
use super::indicator::IndicatorSeries;
use super::indicator::rsi::{self, calculate_rsi};
use super::metrics::{PerformanceMetrics, TradeSummary};
use super::portfolio::{EquityPoint, Portfolio};
use super::position::Trade;
use super::price::PriceSeries;
use super::signal::{Signal, Thresholds, generate_signals};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestParams {
    pub initial_capital: f64,
    /// Fraction of traded notional, in `[0, 1)`.
    pub fee_rate: f64,
    pub overbought: f64,
    pub oversold: f64,
    pub period: usize,
}

impl Default for BacktestParams {
    fn default() -> Self {
        BacktestParams {
            initial_capital: 10_000.0,
            fee_rate: 0.001,
            overbought: 70.0,
            oversold: 30.0,
            period: rsi::DEFAULT_PERIOD,
        }
    }
}

impl BacktestParams {
    pub fn validate(&self) -> Result<Thresholds, BacktestError> {
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(BacktestError::invalid(format!(
                "initial capital must be positive, got {}",
                self.initial_capital
            )));
        }
        if !(0.0..1.0).contains(&self.fee_rate) {
            return Err(BacktestError::invalid(format!(
                "fee rate must be in [0, 1), got {}",
                self.fee_rate
            )));
        }
        if self.period == 0 {
            return Err(BacktestError::invalid("period must be a positive integer"));
        }
        Thresholds::new(self.overbought, self.oversold)
    }
}

/// Everything one run produces, handed to reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub prices: PriceSeries,
    pub indicator: IndicatorSeries,
    pub signals: Vec<Signal>,
    pub portfolio: Portfolio,
    pub baseline_curve: Vec<EquityPoint>,
    pub strategy_metrics: PerformanceMetrics,
    pub baseline_metrics: PerformanceMetrics,
    pub trade_summary: TradeSummary,
}

impl BacktestResult {
    pub fn strategy_curve(&self) -> &[EquityPoint] {
        &self.portfolio.equity_curve
    }

    pub fn trades(&self) -> &[Trade] {
        &self.portfolio.trades
    }

    pub fn baseline_final_value(&self) -> f64 {
        self.baseline_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(self.portfolio.initial_capital)
    }
}

pub fn run_backtest(
    prices: &PriceSeries,
    params: &BacktestParams,
) -> Result<BacktestResult, BacktestError> {
    let thresholds = params.validate()?;
    let points = prices.points();

    let indicator = calculate_rsi(points, params.period)?;
    let signals = generate_signals(&indicator, &thresholds);
    let portfolio = simulate(points, &signals, params.initial_capital, params.fee_rate);
    let baseline_curve = buy_and_hold(points, params.initial_capital);

    let strategy_metrics = PerformanceMetrics::compute(&portfolio.equity_curve);
    let baseline_metrics = PerformanceMetrics::compute(&baseline_curve);
    let trade_summary = TradeSummary::compute(&portfolio);

    Ok(BacktestResult {
        prices: prices.clone(),
        indicator,
        signals,
        portfolio,
        baseline_curve,
        strategy_metrics,
        baseline_metrics,
        trade_summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::PricePoint;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceSeries::new(
            closes
                .iter()
                .enumerate()
                .map(|(i, &close)| PricePoint {
                    date: start + chrono::Duration::days(i as i64),
                    close,
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn default_params_are_valid() {
        let params = BacktestParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.period, 14);
    }

    #[test]
    fn rejects_non_positive_capital() {
        for capital in [0.0, -1.0, f64::NAN] {
            let params = BacktestParams {
                initial_capital: capital,
                ..BacktestParams::default()
            };
            assert!(matches!(
                params.validate(),
                Err(BacktestError::InvalidParameters { .. })
            ));
        }
    }

    #[test]
    fn rejects_fee_outside_unit_interval() {
        for fee in [-0.01, 1.0, 1.5] {
            let params = BacktestParams {
                fee_rate: fee,
                ..BacktestParams::default()
            };
            assert!(params.validate().is_err(), "fee {} accepted", fee);
        }
    }

    #[test]
    fn rejects_zero_period() {
        let params = BacktestParams {
            period: 0,
            ..BacktestParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn invalid_params_win_over_insufficient_data() {
        let params = BacktestParams {
            oversold: 50.0,
            overbought: 50.0,
            ..BacktestParams::default()
        };
        let err = run_backtest(&PriceSeries::default(), &params).unwrap_err();
        assert!(matches!(err, BacktestError::InvalidParameters { .. }));
    }

    #[test]
    fn short_series_is_insufficient() {
        let err = run_backtest(&make_series(&[1.0, 2.0, 3.0]), &BacktestParams::default())
            .unwrap_err();
        assert!(matches!(
            err,
            BacktestError::InsufficientData {
                bars: 3,
                minimum: 15
            }
        ));
    }

    #[test]
    fn huge_period_is_insufficient_not_a_panic() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let params = BacktestParams {
            period: usize::MAX,
            ..BacktestParams::default()
        };
        let err = run_backtest(&make_series(&closes), &params).unwrap_err();
        assert!(matches!(err, BacktestError::InsufficientData { bars: 30, .. }));
        assert_eq!(err.exit_status(), 5);
    }

    #[test]
    fn result_bundle_is_aligned() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + ((i * 7) % 11) as f64).collect();
        let prices = make_series(&closes);
        let result = run_backtest(&prices, &BacktestParams::default()).unwrap();

        assert_eq!(result.indicator.len(), 40);
        assert_eq!(result.signals.len(), 40);
        assert_eq!(result.strategy_curve().len(), 40);
        assert_eq!(result.baseline_curve.len(), 40);
        assert_relative_eq!(result.strategy_curve()[0].equity, 10_000.0);
        assert_relative_eq!(result.baseline_curve[0].equity, 10_000.0);
        assert_eq!(result.trade_summary.trade_count, result.trades().len());
        assert_relative_eq!(
            result.baseline_final_value(),
            10_000.0 * closes[39] / closes[0],
            epsilon = 1e-9
        );
    }
}
