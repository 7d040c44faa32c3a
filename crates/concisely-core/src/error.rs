//! Aggregate error type for core services.

use thiserror::Error;

use crate::ports::{GatewayError, LlmError, RepositoryError, TranscodeError};

/// Errors surfaced by core services.
///
/// Wraps the port-level errors so services can use `?` across ports while
/// adapters still see which boundary failed.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Transcode(#[from] TranscodeError),
}
