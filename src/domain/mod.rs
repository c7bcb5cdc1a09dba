//! Core domain types and logic. Pure and synchronous: no I/O, no logging.

pub mod price;
pub mod indicator;
pub mod signal;
pub mod position;
pub mod portfolio;
pub mod execution;
pub mod baseline;
pub mod metrics;
pub mod backtest;
pub mod instrument;
pub mod config_validation;
pub mod error;
