//! Domain error taxonomy.

/// Top-level error type for frontier.
#[derive(Debug, thiserror::Error)]
pub enum FrontierError {
    #[error("degenerate input: {reason}")]
    DegenerateInput { reason: String },

    #[error("price data unavailable: {reason}")]
    DataUnavailable { reason: String },

    #[error("numerical fault: {reason}")]
    Numerical { reason: String },

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

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FrontierError {
    pub fn degenerate(reason: impl Into<String>) -> Self {
        FrontierError::DegenerateInput {
            reason: reason.into(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        FrontierError::DataUnavailable {
            reason: reason.into(),
        }
    }

    pub fn numerical(reason: impl Into<String>) -> Self {
        FrontierError::Numerical {
            reason: reason.into(),
        }
    }
}

impl From<&FrontierError> for std::process::ExitCode {
    fn from(err: &FrontierError) -> Self {
        let code: u8 = match err {
            FrontierError::Io(_) => 1,
            FrontierError::ConfigParse { .. }
            | FrontierError::ConfigMissing { .. }
            | FrontierError::ConfigInvalid { .. } => 2,
            FrontierError::DegenerateInput { .. } => 3,
            FrontierError::DataUnavailable { .. } => 4,
            FrontierError::Numerical { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
