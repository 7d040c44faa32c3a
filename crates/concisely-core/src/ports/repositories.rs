//! Storage ports for messages, chat state, sticker cache and summaries.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{ChatMessage, NewChatMessage, SummaryRecord};

/// Port for chat message persistence.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Save a message. Saving the same `(chat_id, message_id)` again
    /// replaces the stored row.
    async fn save_message(&self, msg: NewChatMessage) -> Result<(), RepositoryError>;

    /// Messages with `after < message_id <= up_to`, ascending by id.
    async fn messages_in_range(
        &self,
        chat_id: i64,
        after: i64,
        up_to: i64,
    ) -> Result<Vec<ChatMessage>, RepositoryError>;

    /// The latest `limit` messages of a chat, in chronological order.
    async fn last_messages(
        &self,
        chat_id: i64,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, RepositoryError>;
}

/// Port for per-chat summary progress.
#[async_trait]
pub trait ChatStateRepository: Send + Sync {
    /// Id of the last message covered by a summary, if a baseline exists.
    async fn last_summary_message_id(&self, chat_id: i64) -> Result<Option<i64>, RepositoryError>;

    /// Upsert the last summarized message id.
    async fn set_last_summary_message_id(
        &self,
        chat_id: i64,
        message_id: i64,
    ) -> Result<(), RepositoryError>;
}

/// Port for the sticker description cache, keyed by Telegram's
/// `file_unique_id` (stable across bots and re-uploads).
#[async_trait]
pub trait StickerCacheRepository: Send + Sync {
    async fn sticker_description(
        &self,
        file_unique_id: &str,
    ) -> Result<Option<String>, RepositoryError>;

    async fn save_sticker_description(
        &self,
        file_unique_id: &str,
        description: &str,
    ) -> Result<(), RepositoryError>;
}

/// Port for the summary history.
#[async_trait]
pub trait SummaryRepository: Send + Sync {
    async fn save_summary(&self, record: SummaryRecord) -> Result<i64, RepositoryError>;

    /// Most recent summaries of a chat, newest first.
    async fn recent_summaries(
        &self,
        chat_id: i64,
        limit: u32,
    ) -> Result<Vec<SummaryRecord>, RepositoryError>;
}
