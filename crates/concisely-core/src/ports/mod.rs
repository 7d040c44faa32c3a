//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `sqlx`, `reqwest` or Telegram wire types in any signature
//! - Repositories are minimal and query-focused
//! - Media payloads cross the boundary as raw bytes; encoding is the adapter's job

pub mod chat_gateway;
pub mod llm;
pub mod repositories;
pub mod transcoder;
pub mod wide_log_sink;

use std::sync::Arc;
use thiserror::Error;

pub use chat_gateway::{ChatGateway, GatewayError, ParseMode};
pub use llm::{Completion, Description, LlmError, LlmPort, MediaPayload, ModelRoster};
pub use repositories::{
    ChatStateRepository, MessageRepository, StickerCacheRepository, SummaryRepository,
};
pub use transcoder::{AudioTranscoder, TranscodeError};
pub use wide_log_sink::WideLogSink;

#[cfg(test)]
pub use chat_gateway::MockChatGateway;

/// Container for all repository trait objects.
///
/// Lets adapters wire storage without coupling services to a concrete
/// backend. `concisely-db` builds one from a pool.
#[derive(Clone)]
pub struct Repos {
    /// Stored chat messages.
    pub messages: Arc<dyn MessageRepository>,
    /// Per-chat summary progress.
    pub chat_state: Arc<dyn ChatStateRepository>,
    /// Cached sticker descriptions.
    pub stickers: Arc<dyn StickerCacheRepository>,
    /// Generated summaries.
    pub summaries: Arc<dyn SummaryRepository>,
}

impl Repos {
    /// Create a new Repos container.
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        chat_state: Arc<dyn ChatStateRepository>,
        stickers: Arc<dyn StickerCacheRepository>,
        summaries: Arc<dyn SummaryRepository>,
    ) -> Self {
        Self {
            messages,
            chat_state,
            stickers,
            summaries,
        }
    }
}

/// Domain-specific errors for repository operations.
///
/// This error type abstracts away storage implementation details (e.g., sqlx errors)
/// and provides a clean interface for services to handle storage failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested entity was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage backend error (database, filesystem, etc.).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}
