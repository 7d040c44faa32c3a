//! Chat platform port.
//!
//! Abstracts the outbound half of the chat platform: posting messages and
//! downloading attached files. Receiving updates is the adapter's job.

use async_trait::async_trait;
use thiserror::Error;

/// Text formatting mode for outgoing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Html,
    Plain,
}

/// Errors from the chat platform.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The platform rejected the request (e.g. malformed HTML entities).
    #[error("API error {code:?}: {description}")]
    Api {
        code: Option<i64>,
        description: String,
    },

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response didn't match the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Post a message to a chat.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        mode: ParseMode,
    ) -> Result<(), GatewayError>;

    /// Download a file by its platform file id.
    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, GatewayError>;
}
