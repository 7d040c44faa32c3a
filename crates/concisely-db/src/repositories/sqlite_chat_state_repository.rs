//! `SQLite` implementation of the `ChatStateRepository` trait.

use async_trait::async_trait;
use sqlx::SqlitePool;

use concisely_core::{ChatStateRepository, RepositoryError};

/// `SQLite` implementation of the `ChatStateRepository` trait.
pub struct SqliteChatStateRepository {
    pool: SqlitePool,
}

impl SqliteChatStateRepository {
    /// Create a new `SQLite` chat state repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatStateRepository for SqliteChatStateRepository {
    async fn last_summary_message_id(&self, chat_id: i64) -> Result<Option<i64>, RepositoryError> {
        sqlx::query_scalar("SELECT last_summary_message_id FROM chat_state WHERE chat_id = ?")
            .bind(chat_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))
    }

    async fn set_last_summary_message_id(
        &self,
        chat_id: i64,
        message_id: i64,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO chat_state (chat_id, last_summary_message_id, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(chat_id) DO UPDATE SET
                last_summary_message_id = excluded.last_summary_message_id,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(chat_id)
        .bind(message_id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        Ok(())
    }
}
