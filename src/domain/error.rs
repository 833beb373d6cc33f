//! Domain error types.

/// Top-level error type for quantjournal.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("invalid candidate trade: {reason}")]
    InvalidCandidate { reason: String },

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

    #[error("ledger store error: {reason}")]
    Store { reason: String },

    #[error("row {position} out of range: ledger has {len} rows")]
    RowOutOfRange { position: usize, len: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&JournalError> for std::process::ExitCode {
    fn from(err: &JournalError) -> Self {
        let code: u8 = match err {
            JournalError::Io(_) => 1,
            JournalError::ConfigParse { .. }
            | JournalError::ConfigMissing { .. }
            | JournalError::ConfigInvalid { .. } => 2,
            JournalError::Store { .. } => 3,
            JournalError::InvalidCandidate { .. } => 4,
            JournalError::RowOutOfRange { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
