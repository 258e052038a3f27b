//! Domain error types.

/// Top-level error type for macdtrader.
#[derive(Debug, thiserror::Error)]
pub enum MacdTraderError {
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("{stage}: required input {input} has not been computed")]
    MissingInput { stage: String, input: String },

    #[error("inconsistent ledger at entry {index}: {reason}")]
    InconsistentLedger { index: usize, reason: String },

    #[error("no trades were executed")]
    EmptyLedger,

    #[error("invalid price series: {reason}")]
    InvalidPriceSeries { reason: String },

    #[error("data import error: {reason}")]
    DataImport { reason: String },

    #[error("export error: {reason}")]
    Export { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MacdTraderError {
    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        MacdTraderError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&MacdTraderError> for std::process::ExitCode {
    fn from(err: &MacdTraderError) -> Self {
        let code: u8 = match err {
            MacdTraderError::Io(_) | MacdTraderError::Export { .. } => 1,
            MacdTraderError::ConfigParse { .. }
            | MacdTraderError::ConfigInvalid { .. } => 2,
            MacdTraderError::DataImport { .. } | MacdTraderError::InvalidPriceSeries { .. } => 3,
            MacdTraderError::InvalidParameter { .. } => 4,
            MacdTraderError::MissingInput { .. }
            | MacdTraderError::InconsistentLedger { .. }
            | MacdTraderError::EmptyLedger => 5,
        };
        std::process::ExitCode::from(code)
    }
}
