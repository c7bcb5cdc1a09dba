//! Report generation port trait.

use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::BacktestError;
use crate::domain::instrument::Instrument;

/// Port for writing backtest results.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        instrument: &Instrument,
        output_dir: &Path,
    ) -> Result<(), BacktestError>;
}
