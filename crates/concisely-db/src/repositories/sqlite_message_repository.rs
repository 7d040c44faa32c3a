//! `SQLite` implementation of the `MessageRepository` trait.

use async_trait::async_trait;
use sqlx::SqlitePool;

use concisely_core::{ChatMessage, MessageRepository, NewChatMessage, RepositoryError};

use super::row_mappers::{MESSAGE_SELECT_COLUMNS, row_to_message};

/// `SQLite` implementation of the `MessageRepository` trait.
///
/// The attachment and raw update are stored as JSON text.
pub struct SqliteMessageRepository {
    pool: SqlitePool,
}

impl SqliteMessageRepository {
    /// Create a new `SQLite` message repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for SqliteMessageRepository {
    async fn save_message(&self, msg: NewChatMessage) -> Result<(), RepositoryError> {
        let attachment = msg
            .attachment
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let raw = serde_json::to_string(&msg.raw)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO messages (
                chat_id, message_id, sender_id, sender_name, text,
                reply_to_message_id, forward_sender_name, timestamp, attachment, raw
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(msg.chat_id)
        .bind(msg.message_id)
        .bind(msg.sender_id)
        .bind(&msg.sender_name)
        .bind(&msg.text)
        .bind(msg.reply_to_message_id)
        .bind(&msg.forward_sender_name)
        .bind(msg.timestamp)
        .bind(attachment)
        .bind(raw)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn messages_in_range(
        &self,
        chat_id: i64,
        after: i64,
        up_to: i64,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let sql = format!(
            "SELECT {MESSAGE_SELECT_COLUMNS} FROM messages \
             WHERE chat_id = ? AND message_id > ? AND message_id <= ? \
             ORDER BY message_id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(chat_id)
            .bind(after)
            .bind(up_to)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        rows.iter().map(row_to_message).collect()
    }

    async fn last_messages(
        &self,
        chat_id: i64,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let sql = format!(
            "SELECT {MESSAGE_SELECT_COLUMNS} FROM messages \
             WHERE chat_id = ? ORDER BY message_id DESC LIMIT ?"
        );
        let rows = sqlx::query(&sql)
            .bind(chat_id)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        let mut messages = rows
            .iter()
            .map(row_to_message)
            .collect::<Result<Vec<_>, _>>()?;
        messages.reverse();
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;
    use chrono::{TimeZone, Utc};
    use concisely_core::Attachment;

    fn new_message(chat_id: i64, message_id: i64, text: &str) -> NewChatMessage {
        NewChatMessage {
            chat_id,
            message_id,
            sender_id: Some(42),
            sender_name: "Anna".to_string(),
            text: text.to_string(),
            reply_to_message_id: None,
            forward_sender_name: None,
            timestamp: None,
            raw: serde_json::json!({"message_id": message_id}),
            attachment: None,
        }
    }

    async fn repo() -> SqliteMessageRepository {
        SqliteMessageRepository::new(setup_test_database().await.unwrap())
    }

    #[tokio::test]
    async fn test_save_and_read_back_all_fields() {
        let repo = repo().await;
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap();
        let msg = NewChatMessage {
            reply_to_message_id: Some(3),
            forward_sender_name: Some("Boris".to_string()),
            timestamp: Some(ts),
            attachment: Some(Attachment::Sticker {
                emoji: "🔥".to_string(),
                description: Some("a fire".to_string()),
            }),
            ..new_message(-100, 5, "look")
        };

        repo.save_message(msg).await.unwrap();
        let stored = repo.messages_in_range(-100, 0, 10).await.unwrap();

        assert_eq!(stored.len(), 1);
        let m = &stored[0];
        assert_eq!(m.sender_id, Some(42));
        assert_eq!(m.reply_to_message_id, Some(3));
        assert_eq!(m.forward_sender_name.as_deref(), Some("Boris"));
        assert_eq!(m.timestamp, Some(ts));
        assert_eq!(m.attachment.as_ref().and_then(Attachment::description), Some("a fire"));
    }

    #[tokio::test]
    async fn test_range_is_exclusive_inclusive_and_per_chat() {
        let repo = repo().await;
        for id in 1..=5 {
            repo.save_message(new_message(-100, id, "a")).await.unwrap();
        }
        repo.save_message(new_message(-200, 3, "other")).await.unwrap();

        let ids: Vec<i64> = repo
            .messages_in_range(-100, 2, 4)
            .await
            .unwrap()
            .iter()
            .map(|m| m.message_id)
            .collect();
        assert_eq!(ids, vec![3, 4]);
    }

    #[tokio::test]
    async fn test_save_same_id_replaces() {
        let repo = repo().await;
        repo.save_message(new_message(-100, 1, "first")).await.unwrap();
        repo.save_message(new_message(-100, 1, "edited")).await.unwrap();

        let stored = repo.messages_in_range(-100, 0, 1).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].text, "edited");
    }

    #[tokio::test]
    async fn test_last_messages_are_chronological() {
        let repo = repo().await;
        for id in 1..=10 {
            repo.save_message(new_message(-100, id, "a")).await.unwrap();
        }

        let ids: Vec<i64> = repo
            .last_messages(-100, 3)
            .await
            .unwrap()
            .iter()
            .map(|m| m.message_id)
            .collect();
        assert_eq!(ids, vec![8, 9, 10]);
    }
}
