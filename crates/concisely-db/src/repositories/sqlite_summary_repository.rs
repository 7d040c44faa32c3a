//! `SQLite` implementation of the `SummaryRepository` trait.

use async_trait::async_trait;
use sqlx::SqlitePool;

use concisely_core::{RepositoryError, SummaryRecord, SummaryRepository};

use super::row_mappers::{SUMMARY_SELECT_COLUMNS, row_to_summary};

/// `SQLite` implementation of the `SummaryRepository` trait.
///
/// Summaries are append-only; nothing reads them back on the hot path.
pub struct SqliteSummaryRepository {
    pool: SqlitePool,
}

impl SqliteSummaryRepository {
    /// Create a new `SQLite` summary repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SummaryRepository for SqliteSummaryRepository {
    async fn save_summary(&self, record: SummaryRecord) -> Result<i64, RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO summaries (
                chat_id, from_message_id, to_message_id, model, duration_ms,
                summary_text, input_tokens, output_tokens, cost
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.chat_id)
        .bind(record.from_message_id)
        .bind(record.to_message_id)
        .bind(&record.model)
        .bind(record.duration_ms)
        .bind(&record.summary_text)
        .bind(record.input_tokens)
        .bind(record.output_tokens)
        .bind(record.cost)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

    async fn recent_summaries(
        &self,
        chat_id: i64,
        limit: u32,
    ) -> Result<Vec<SummaryRecord>, RepositoryError> {
        let sql = format!(
            "SELECT {SUMMARY_SELECT_COLUMNS} FROM summaries \
             WHERE chat_id = ? ORDER BY id DESC LIMIT ?"
        );
        let rows = sqlx::query(&sql)
            .bind(chat_id)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        rows.iter().map(row_to_summary).collect()
    }
}
