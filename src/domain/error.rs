//! Domain error types.

/// Top-level error type for rsitrader.
#[derive(Debug, thiserror::Error)]
pub enum BacktestError {
    #[error("invalid parameters: {reason}")]
    InvalidParameters { reason: String },

    #[error("insufficient data: have {bars} price points, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("invalid price series: {reason}")]
    InvalidPriceSeries { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown instrument: {symbol}")]
    UnknownInstrument { symbol: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BacktestError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        BacktestError::InvalidParameters {
            reason: reason.into(),
        }
    }

    /// Process exit status for this error category.
    pub fn exit_status(&self) -> u8 {
        match self {
            BacktestError::Io(_) => 1,
            BacktestError::ConfigParse { .. }
            | BacktestError::ConfigMissing { .. }
            | BacktestError::ConfigInvalid { .. }
            | BacktestError::UnknownInstrument { .. } => 2,
            BacktestError::InvalidParameters { .. } => 3,
            BacktestError::Data { .. }
            | BacktestError::InvalidPriceSeries { .. }
            | BacktestError::InsufficientData { .. } => 5,
        }
    }
}

impl From<&BacktestError> for std::process::ExitCode {
    fn from(err: &BacktestError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
