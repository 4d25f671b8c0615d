//! Client error types

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with `"status": "error"`
    #[error("Service error ({status}): {message}")]
    Service { status: u16, message: String },

    /// No remote file matched the request
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body did not match the contract
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether the service could not be reached at all
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_connect() || e.is_timeout())
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Http(e) if e.is_timeout() => ErrorCode::TimeoutError,
            Self::Http(e) if e.is_connect() => ErrorCode::CloudServiceUnavailable,
            Self::Http(_) => ErrorCode::NetworkError,
            Self::Service { .. } => ErrorCode::CloudServiceError,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::InvalidResponse(_) | Self::Serialization(_) => ErrorCode::InvalidFormat,
        }
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        AppError::with_message(err.error_code(), err.to_string())
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
