//! Domain error types.

/// Top-level error type for tradelab.
#[derive(Debug, thiserror::Error)]
pub enum TradelabError {
    #[error("invalid price data: {reason}")]
    Validation { reason: String },

    #[error("invalid parameter {name}: {reason}")]
    Parameter { name: String, reason: String },

    #[error("cannot combine results: {reason}")]
    Combination { reason: String },

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

    #[error("data error for {symbol}: {reason}")]
    Data { symbol: String, reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TradelabError {
    pub fn validation(reason: impl Into<String>) -> Self {
        TradelabError::Validation {
            reason: reason.into(),
        }
    }

    pub fn parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        TradelabError::Parameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<&TradelabError> for std::process::ExitCode {
    fn from(err: &TradelabError) -> Self {
        let code: u8 = match err {
            TradelabError::Io(_) | TradelabError::Csv(_) => 1,
            TradelabError::ConfigParse { .. }
            | TradelabError::ConfigMissing { .. }
            | TradelabError::ConfigInvalid { .. } => 2,
            TradelabError::Parameter { .. } => 3,
            TradelabError::Validation { .. } | TradelabError::Data { .. } => 4,
            TradelabError::Combination { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
