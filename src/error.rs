use axum::http::StatusCode;
use std::io;

/// Custom error type for simple_change_log operations
#[derive(Debug, thiserror::Error)]
pub enum ChangeLogError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Fetching '{url}' failed: {message}")]
    Fetch { url: String, message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ChangeLogError {
    pub fn missing_field(path: &str) -> Self {
        ChangeLogError::MalformedPayload(format!("missing field '{}'", path))
    }

    pub fn fetch(url: &str, message: impl ToString) -> Self {
        ChangeLogError::Fetch {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    /// HTTP status reported to the caller when an invocation fails.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ChangeLogError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            ChangeLogError::Fetch { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Helper type for Results that use ChangeLogError
pub type Result<T> = std::result::Result<T, ChangeLogError>;
