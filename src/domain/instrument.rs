//! Instrument table and backtest window.
//!
//! Both are plain values handed to the pipeline entry point; the CLI builds
//! them from configuration or falls back to the built-in defaults.

use chrono::NaiveDate;
use std::collections::HashSet;

use super::error::BacktestError;

const BUILTIN_INSTRUMENTS: &[(&str, &str)] = &[
    ("AAPL", "Apple Inc."),
    ("MSFT", "Microsoft Corporation"),
    ("AMZN", "Amazon.com, Inc."),
    ("GOOGL", "Alphabet Inc. Class A"),
    ("GOOG", "Alphabet Inc. Class C"),
    ("META", "Meta Platforms, Inc."),
    ("TSLA", "Tesla, Inc."),
    ("NVDA", "NVIDIA Corporation"),
    ("JPM", "JPMorgan Chase & Co."),
];

pub const DEFAULT_SYMBOL: &str = "JPM";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    pub symbol: String,
    pub name: String,
}

impl Instrument {
    /// "Apple Inc. (AAPL)"
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.symbol)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentTable {
    instruments: Vec<Instrument>,
}

impl InstrumentTable {
    pub fn builtin() -> Self {
        Self {
            instruments: BUILTIN_INSTRUMENTS
                .iter()
                .map(|(symbol, name)| Instrument {
                    symbol: symbol.to_string(),
                    name: name.to_string(),
                })
                .collect(),
        }
    }

    /// Build from `(symbol, name)` pairs. Symbols are upper-cased; an empty
    /// name falls back to the symbol.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, SymbolListError>
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut instruments = Vec::new();

        for (symbol, name) in entries {
            let symbol = symbol.as_ref().trim().to_uppercase();
            if symbol.is_empty() {
                return Err(SymbolListError::EmptyToken);
            }
            if !seen.insert(symbol.clone()) {
                return Err(SymbolListError::DuplicateSymbol(symbol));
            }
            let name = match name.as_ref().trim() {
                "" => symbol.clone(),
                n => n.to_string(),
            };
            instruments.push(Instrument { symbol, name });
        }

        Ok(Self { instruments })
    }

    pub fn find(&self, symbol: &str) -> Option<&Instrument> {
        self.instruments
            .iter()
            .find(|i| i.symbol.eq_ignore_ascii_case(symbol.trim()))
    }

    pub fn resolve(&self, symbol: &str) -> Result<&Instrument, BacktestError> {
        self.find(symbol).ok_or_else(|| BacktestError::UnknownInstrument {
            symbol: symbol.trim().to_uppercase(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instrument> {
        self.instruments.iter()
    }

    pub fn count(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

impl Default for InstrumentTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SymbolListError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),
}

/// Split a comma-separated symbol list, upper-casing each entry.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, SymbolListError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(SymbolListError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(SymbolListError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

/// Closed date range `[start, end]` of one backtest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, BacktestError> {
        if start >= end {
            return Err(BacktestError::invalid(format!(
                "start date {} must be before end date {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap_or_default(),
        }
    }
}
