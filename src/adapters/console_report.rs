//! Plain-text comparison table for the terminal.
//!
//! One row per metric, one column per strategy. Undefined (`NaN`) values
//! and rows that do not apply to the baseline print as `N/A`.

use crate::domain::backtest::BacktestResult;

const NOT_AVAILABLE: &str = "N/A";
const LABEL_WIDTH: usize = 18;
const COLUMN_WIDTH: usize = 16;

pub fn format_comparison_table(result: &BacktestResult) -> String {
    let strategy = &result.strategy_metrics;
    let baseline = &result.baseline_metrics;
    let summary = &result.trade_summary;

    let rows = [
        (
            "Portfolio Value",
            format_currency(summary.final_value),
            format_currency(result.baseline_final_value()),
        ),
        (
            "Total Return",
            format_percent(strategy.total_return),
            format_percent(baseline.total_return),
        ),
        (
            "Max. Drawdown",
            format_percent(strategy.max_drawdown),
            format_percent(baseline.max_drawdown),
        ),
        (
            "Volatility",
            format_percent(strategy.annualized_volatility),
            format_percent(baseline.annualized_volatility),
        ),
        (
            "Sharpe Ratio",
            format_ratio(strategy.sharpe_ratio),
            format_ratio(baseline.sharpe_ratio),
        ),
        (
            "Fees Paid",
            format_currency(summary.fees_paid),
            NOT_AVAILABLE.to_string(),
        ),
        (
            "Number of Trades",
            summary.trade_count.to_string(),
            NOT_AVAILABLE.to_string(),
        ),
    ];

    let mut output = format_row("", "RSI-Strategy", "Buy-n-Hold");
    output.push_str(&"-".repeat(LABEL_WIDTH + 2 * COLUMN_WIDTH));
    output.push('\n');
    for (label, left, right) in rows {
        output.push_str(&format_row(label, &left, &right));
    }
    output
}

fn format_row(label: &str, left: &str, right: &str) -> String {
    format!(
        "{:<lw$}{:>cw$}{:>cw$}\n",
        label,
        left,
        right,
        lw = LABEL_WIDTH,
        cw = COLUMN_WIDTH
    )
}

/// `$12,345.68`
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{}${}.{}", sign, group_thousands(whole), cents)
}

/// Fraction to percent with two decimals: `0.1234` → `12.34%`.
pub fn format_percent(value: f64) -> String {
    if value.is_nan() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.2}%", value * 100.0)
}

pub fn format_ratio(value: f64) -> String {
    if value.is_nan() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.2}", value)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
