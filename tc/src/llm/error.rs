//! LLM error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during LLM operations
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API key not found. Set the {0} environment variable or add it to .env.")]
    MissingApiKey(String),
}

/// Coarse classification used for user-facing diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authentication,
    RateLimited,
    Billing,
    BadRequest,
    Connection,
    Server,
    Other,
}

impl LlmError {
    /// Get the retry duration if this is a rate limit error
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LlmError::RateLimited { .. } => ErrorKind::RateLimited,
            LlmError::MissingApiKey(_) => ErrorKind::Authentication,
            LlmError::ApiError { status, message } => match status {
                401 | 403 => ErrorKind::Authentication,
                429 => ErrorKind::RateLimited,
                400 => {
                    let lower = message.to_lowercase();
                    if lower.contains("credit balance") || lower.contains("billing") {
                        ErrorKind::Billing
                    } else {
                        ErrorKind::BadRequest
                    }
                }
                s if *s >= 500 => ErrorKind::Server,
                _ => ErrorKind::Other,
            },
            LlmError::Network(_) | LlmError::Timeout(_) => ErrorKind::Connection,
            LlmError::InvalidResponse(_) | LlmError::Json(_) => ErrorKind::Other,
        }
    }
}
