use thiserror::Error;

/// Failure of a single poll round trip. Never fatal: the poll loop logs it
/// and tries again on the next tick.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(u16),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid url: {0}")]
    InvalidUrl(String),
}

/// A payload or injected data set whose columns do not line up.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("column '{column}' has {actual} values, expected {expected}")]
    LengthMismatch {
        column: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("timestamp #{index} ('{value}') is neither RFC 3339 nor epoch milliseconds")]
    Timestamp { index: usize, value: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl From<&str> for ConfigError {
    fn from(error: &str) -> Self {
        ConfigError::Invalid(error.to_string())
    }
}

/// Why a poll sink could not take a payload.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SinkError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("chart is gone")]
    Closed,
}
