use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures that cross an I/O boundary: backend calls, settings loading,
/// snapshot persistence. Local edit validation uses [`Rejection`] instead.
///
/// [`Rejection`]: crate::domain::classification::Rejection
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum AppError {
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Transport error: {0}")]
    TransportError(String),
    #[error("Backend error ({status}): {message}")]
    BackendError { status: u16, message: String },
    #[error("Request cancelled: {0}")]
    Cancelled(String),
    #[error("Config error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(String),
}

impl AppError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::Cancelled(_))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ParseError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
