//! CSV file data adapter.
//!
//! Reads one `<SYMBOL>.csv` per instrument from a base directory. Columns
//! are located by header name (case-insensitive), so both the plain
//! `date,open,high,low,close,volume` layout and vendor exports with extra
//! columns such as `Adj Close` load. Rows with a missing close are dropped.

use crate::domain::error::BacktestError;
use crate::domain::price::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

const MISSING_MARKERS: &[&str] = &["", "null", "nan", "na"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, BacktestError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| BacktestError::Data {
                    reason: format!("missing {} column", name),
                })
        };
        Ok(Columns {
            date: find("date")?,
            open: find("open")?,
            high: find("high")?,
            low: find("low")?,
            close: find("close")?,
            volume: find("volume")?,
        })
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol.to_uppercase()))
    }

    fn read_bars(&self, symbol: &str) -> Result<Vec<OhlcvBar>, BacktestError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| BacktestError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| BacktestError::Data {
            reason: format!("CSV header error in {}: {}", path.display(), e),
        })?;
        let cols = Columns::from_headers(headers)?;

        let mut bars = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| BacktestError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            if is_missing(record.get(cols.close)) {
                debug!(symbol, line = line + 2, "dropping row without close");
                continue;
            }

            let date_str = field(&record, cols.date, "date")?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                BacktestError::Data {
                    reason: format!("invalid date format '{}': {}", date_str, e),
                }
            })?;

            let volume = parse_volume(parse(&record, cols.volume, "volume")?)?;
            bars.push(OhlcvBar {
                date,
                open: parse(&record, cols.open, "open")?,
                high: parse(&record, cols.high, "high")?,
                low: parse(&record, cols.low, "low")?,
                close: parse(&record, cols.close, "close")?,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

fn is_missing(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => MISSING_MARKERS.contains(&v.trim().to_ascii_lowercase().as_str()),
    }
}

fn field<'a>(
    record: &'a csv::StringRecord,
    idx: usize,
    name: &str,
) -> Result<&'a str, BacktestError> {
    record.get(idx).ok_or_else(|| BacktestError::Data {
        reason: format!("missing {} column", name),
    })
}

fn parse<T>(record: &csv::StringRecord, idx: usize, name: &str) -> Result<T, BacktestError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    field(record, idx, name)?
        .trim()
        .parse()
        .map_err(|e| BacktestError::Data {
            reason: format!("invalid {} value: {}", name, e),
        })
}

/// Vendor exports write volume as a float; round it to whole shares.
fn parse_volume(raw: f64) -> Result<i64, BacktestError> {
    if !raw.is_finite() || raw < 0.0 || raw >= i64::MAX as f64 {
        return Err(BacktestError::Data {
            reason: format!("invalid volume value: {}", raw),
        });
    }
    Ok(raw.round() as i64)
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, BacktestError> {
        let mut bars = self.read_bars(symbol)?;
        bars.retain(|b| b.date >= start_date && b.date <= end_date);
        debug!(symbol, bars = bars.len(), %start_date, %end_date, "loaded bars");
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, BacktestError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| BacktestError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| BacktestError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_uppercase());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, BacktestError> {
        if !self.csv_path(symbol).exists() {
            return Ok(None);
        }
        let bars = self.read_bars(symbol)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }
}
