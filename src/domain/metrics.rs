//! Performance metrics and statistics.

use super::portfolio::{EquityPoint, Portfolio};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Scalar summary of one equity curve.
///
/// Undefined values are `NaN`: every field for curves shorter than two
/// points, and volatility/Sharpe whenever the sample standard deviation of
/// daily returns is undefined or zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
}

impl PerformanceMetrics {
    pub fn undefined() -> Self {
        PerformanceMetrics {
            total_return: f64::NAN,
            annualized_volatility: f64::NAN,
            sharpe_ratio: f64::NAN,
            max_drawdown: f64::NAN,
        }
    }

    pub fn compute(equity_curve: &[EquityPoint]) -> Self {
        if equity_curve.len() < 2 {
            return Self::undefined();
        }

        let first = equity_curve[0].equity;
        let last = equity_curve[equity_curve.len() - 1].equity;
        let total_return = last / first - 1.0;
        let returns = daily_returns(equity_curve);
        let (annualized_volatility, sharpe_ratio) = compute_risk_adjusted(&returns);

        PerformanceMetrics {
            total_return,
            annualized_volatility,
            sharpe_ratio,
            max_drawdown: compute_max_drawdown(equity_curve),
        }
    }
}

/// Fee and activity totals for the strategy run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeSummary {
    pub final_value: f64,
    pub fees_paid: f64,
    pub trade_count: usize,
}

impl TradeSummary {
    pub fn compute(portfolio: &Portfolio) -> Self {
        TradeSummary {
            final_value: portfolio.final_equity(),
            fees_paid: portfolio.fees_paid(),
            trade_count: portfolio.trades.len(),
        }
    }
}

/// r[t] = equity[t] / equity[t-1] - 1
pub fn daily_returns(equity_curve: &[EquityPoint]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| w[1].equity / w[0].equity - 1.0)
        .collect()
}

/// Most negative `equity / running_peak - 1`; 0.0 for a non-decreasing curve.
pub fn compute_max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;

    for point in equity_curve {
        peak = peak.max(point.equity);
        let dd = point.equity / peak - 1.0;
        if dd < max_dd {
            max_dd = dd;
        }
    }

    max_dd
}

/// Returns (annualized volatility, Sharpe ratio) without a risk-free rate.
fn compute_risk_adjusted(returns: &[f64]) -> (f64, f64) {
    if returns.len() < 2 {
        return (f64::NAN, f64::NAN);
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();

    let annualization = TRADING_DAYS_PER_YEAR.sqrt();
    let sharpe = if stddev > 0.0 {
        mean / stddev * annualization
    } else {
        f64::NAN
    };

    (stddev * annualization, sharpe)
}
