//! Configuration reading and validation.
//!
//! Every key is optional and falls back to its default, but a key that is
//! present must parse and lie in range. All checks run before any price
//! data is fetched.

use crate::domain::backtest::BacktestParams;
use crate::domain::error::BacktestError;
use crate::domain::instrument::{DEFAULT_SYMBOL, DateRange, InstrumentTable};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::str::FromStr;

pub const DEFAULT_DATA_DIR: &str = "data";

/// Validate every section the backtest reads.
pub fn validate_config(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    read_backtest_params(config)?;
    read_date_range(config)?;
    let table = read_instrument_table(config)?;
    let symbol = default_symbol(config);
    table
        .resolve(&symbol)
        .map_err(|_| BacktestError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "instrument".to_string(),
            reason: format!("{} is not in the instrument table", symbol),
        })?;
    Ok(())
}

pub fn read_backtest_params(config: &dyn ConfigPort) -> Result<BacktestParams, BacktestError> {
    let defaults = BacktestParams::default();
    let params = BacktestParams {
        initial_capital: read_value(
            config,
            "backtest",
            "initial_capital",
            defaults.initial_capital,
        )?,
        fee_rate: read_value(config, "backtest", "fee_rate", defaults.fee_rate)?,
        overbought: read_value(config, "strategy", "overbought", defaults.overbought)?,
        oversold: read_value(config, "strategy", "oversold", defaults.oversold)?,
        period: read_value(config, "strategy", "period", defaults.period)?,
    };

    validate_initial_capital(params.initial_capital)?;
    validate_fee_rate(params.fee_rate)?;
    validate_period(params.period)?;
    validate_thresholds(params.overbought, params.oversold)?;
    Ok(params)
}

pub fn read_date_range(config: &dyn ConfigPort) -> Result<DateRange, BacktestError> {
    let defaults = DateRange::default();
    let start = match config.get_string("backtest", "start_date") {
        Some(s) => parse_date(&s, "start_date")?,
        None => defaults.start,
    };
    let end = match config.get_string("backtest", "end_date") {
        Some(s) => parse_date(&s, "end_date")?,
        None => defaults.end,
    };

    DateRange::new(start, end).map_err(|_| BacktestError::ConfigInvalid {
        section: "backtest".to_string(),
        key: "start_date".to_string(),
        reason: "start_date must be before end_date".to_string(),
    })
}

/// `[instruments]` entries, or the built-in table when the section is empty.
pub fn read_instrument_table(config: &dyn ConfigPort) -> Result<InstrumentTable, BacktestError> {
    let entries = config.section_entries("instruments");
    if entries.is_empty() {
        return Ok(InstrumentTable::builtin());
    }
    InstrumentTable::from_entries(entries).map_err(|e| BacktestError::ConfigInvalid {
        section: "instruments".to_string(),
        key: "*".to_string(),
        reason: e.to_string(),
    })
}

pub fn default_symbol(config: &dyn ConfigPort) -> String {
    config
        .get_string("backtest", "instrument")
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SYMBOL.to_string())
}

pub fn data_dir(config: &dyn ConfigPort) -> String {
    config
        .get_string("backtest", "data_dir")
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
}

pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate, BacktestError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        BacktestError::ConfigInvalid {
            section: "backtest".to_string(),
            key: field.to_string(),
            reason: format!("invalid {} format, expected YYYY-MM-DD", field),
        }
    })
}

fn read_value<T>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, BacktestError>
where
    T: FromStr,
{
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| BacktestError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("cannot parse '{}'", raw),
        }),
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> BacktestError {
    BacktestError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_initial_capital(value: f64) -> Result<(), BacktestError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_fee_rate(value: f64) -> Result<(), BacktestError> {
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "backtest",
            "fee_rate",
            "fee_rate must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_period(value: usize) -> Result<(), BacktestError> {
    if value < 1 {
        return Err(invalid("strategy", "period", "period must be at least 1"));
    }
    Ok(())
}

fn validate_thresholds(overbought: f64, oversold: f64) -> Result<(), BacktestError> {
    if !(0.0..=100.0).contains(&overbought) {
        return Err(invalid(
            "strategy",
            "overbought",
            "overbought must be between 0 and 100",
        ));
    }
    if !(0.0..=100.0).contains(&oversold) {
        return Err(invalid(
            "strategy",
            "oversold",
            "oversold must be between 0 and 100",
        ));
    }
    if oversold >= overbought {
        return Err(invalid(
            "strategy",
            "oversold",
            "oversold must be below overbought",
        ));
    }
    Ok(())
}
