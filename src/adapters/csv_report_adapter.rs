//! CSV result artifacts.
//!
//! Writes `equity.csv` (one row per trading day with close, RSI, signal and
//! both equity curves) and `trades.csv` (the strategy trade log) into an
//! output directory, created if missing.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::BacktestError;
use crate::domain::instrument::Instrument;
use crate::domain::position::TradeDirection;
use crate::ports::report_port::ReportPort;

pub const EQUITY_FILE: &str = "equity.csv";
pub const TRADES_FILE: &str = "trades.csv";

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

#[derive(Serialize)]
struct EquityRow {
    date: NaiveDate,
    close: f64,
    rsi: Option<f64>,
    signal: String,
    strategy_equity: f64,
    baseline_equity: f64,
}

#[derive(Serialize)]
struct TradeRow {
    date: NaiveDate,
    symbol: String,
    direction: TradeDirection,
    price: f64,
    shares: f64,
    fee: f64,
}

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    fn write_equity(&self, result: &BacktestResult, path: &Path) -> Result<(), BacktestError> {
        let mut wtr = csv::Writer::from_path(path).map_err(csv_error)?;
        let rows = result
            .prices
            .points()
            .iter()
            .zip(&result.indicator.values)
            .zip(&result.signals)
            .zip(result.strategy_curve())
            .zip(&result.baseline_curve);

        for ((((price, rsi), signal), strategy), baseline) in rows {
            wtr.serialize(EquityRow {
                date: price.date,
                close: price.close,
                rsi: rsi.value,
                signal: signal.to_string(),
                strategy_equity: strategy.equity,
                baseline_equity: baseline.equity,
            })
            .map_err(csv_error)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_trades(
        &self,
        result: &BacktestResult,
        instrument: &Instrument,
        path: &Path,
    ) -> Result<(), BacktestError> {
        let mut wtr = csv::Writer::from_path(path).map_err(csv_error)?;
        if result.trades().is_empty() {
            wtr.write_record(["date", "symbol", "direction", "price", "shares", "fee"])
                .map_err(csv_error)?;
        }
        for trade in result.trades() {
            wtr.serialize(TradeRow {
                date: trade.date,
                symbol: instrument.symbol.clone(),
                direction: trade.direction,
                price: trade.price,
                shares: trade.shares,
                fee: trade.fee_paid,
            })
            .map_err(csv_error)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn csv_error(e: csv::Error) -> BacktestError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => BacktestError::Io(io),
        other => BacktestError::Data {
            reason: format!("CSV write error: {:?}", other),
        },
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        instrument: &Instrument,
        output_dir: &Path,
    ) -> Result<(), BacktestError> {
        fs::create_dir_all(output_dir)?;
        self.write_equity(result, &output_dir.join(EQUITY_FILE))?;
        self.write_trades(result, instrument, &output_dir.join(TRADES_FILE))?;
        Ok(())
    }
}
