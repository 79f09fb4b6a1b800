use thiserror::Error;

/// Error type that captures failures outside the validation layer.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("No ValueOperator registered for {0}; register one before use")]
    UnregisteredType(String),
    #[error("Invalid month: {0}")]
    InvalidMonth(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
