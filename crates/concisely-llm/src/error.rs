//! Internal error types for OpenRouter operations.
//!
//! These errors are internal to `concisely-llm` and are mapped to
//! [`LlmError`] at the port boundary.

use concisely_core::LlmError;
use thiserror::Error;

/// Result type alias for OpenRouter operations.
pub type OrResult<T> = Result<T, OrError>;

#[derive(Debug, Error)]
pub enum OrError {
    /// API request failed with an HTTP error status.
    #[error("OpenRouter API request failed with status {status}: {body}")]
    ApiRequestFailed { status: u16, body: String },

    /// API returned an invalid or unexpected response.
    #[error("Invalid response from OpenRouter: {message}")]
    InvalidResponse { message: String },

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<OrError> for LlmError {
    fn from(err: OrError) -> Self {
        match err {
            OrError::ApiRequestFailed { status, body } => Self::Api { status, body },
            OrError::InvalidResponse { message } => Self::InvalidResponse(message),
            OrError::Json(e) => Self::InvalidResponse(e.to_string()),
            OrError::Network(e) => Self::Http(e.to_string()),
            OrError::Url(e) => Self::Http(format!("invalid URL: {e}")),
        }
    }
}
