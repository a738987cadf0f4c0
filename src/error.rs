//! Error types for the pong-rl crate

use thiserror::Error;

/// Main error type for the pong-rl crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("environment not reset: step() called after the episode terminated")]
    EnvironmentNotReset,

    #[error("invalid action index {index} (expected 0=stay, 1=up, 2=down)")]
    InvalidAction { index: usize },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("failed to load agent from {source_name}: {message}")]
    Load {
        source_name: String,
        message: String,
    },

    #[error("unsupported save format version {found} (expected {expected})")]
    UnsupportedFormatVersion { found: u32, expected: u32 },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },

    #[error("invalid {kind} '{input}'. Expected one of: {expected}")]
    ParseChoice {
        kind: String,
        input: String,
        expected: String,
    },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

impl Error {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            message: message.into(),
        }
    }
}
