//! Row mapping helpers for `SQLite` queries.

use chrono::{DateTime, Utc};
use concisely_core::{Attachment, ChatMessage, RepositoryError, SummaryRecord};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

/// Shared SELECT column list for message queries.
pub const MESSAGE_SELECT_COLUMNS: &str = "chat_id, message_id, sender_id, sender_name, text, reply_to_message_id, forward_sender_name, timestamp, attachment";

/// Shared SELECT column list for summary queries.
pub const SUMMARY_SELECT_COLUMNS: &str = "chat_id, from_message_id, to_message_id, model, duration_ms, summary_text, input_tokens, output_tokens, cost";

/// Parse a database row into a [`ChatMessage`].
pub fn row_to_message(row: &SqliteRow) -> Result<ChatMessage, RepositoryError> {
    let attachment_json: Option<String> = row
        .try_get("attachment")
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;

    let attachment = attachment_json
        .map(|json| serde_json::from_str::<Attachment>(&json))
        .transpose()
        .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

    Ok(ChatMessage {
        chat_id: row
            .try_get("chat_id")
            .map_err(|e| RepositoryError::Storage(e.to_string()))?,
        message_id: row
            .try_get("message_id")
            .map_err(|e| RepositoryError::Storage(e.to_string()))?,
        sender_id: row
            .try_get("sender_id")
            .map_err(|e| RepositoryError::Storage(e.to_string()))?,
        sender_name: row
            .try_get("sender_name")
            .map_err(|e| RepositoryError::Storage(e.to_string()))?,
        text: row
            .try_get("text")
            .map_err(|e| RepositoryError::Storage(e.to_string()))?,
        reply_to_message_id: row
            .try_get("reply_to_message_id")
            .map_err(|e| RepositoryError::Storage(e.to_string()))?,
        forward_sender_name: row
            .try_get("forward_sender_name")
            .map_err(|e| RepositoryError::Storage(e.to_string()))?,
        // Rows written by older tooling may carry timestamps sqlx can't parse
        timestamp: row
            .try_get::<Option<DateTime<Utc>>, _>("timestamp")
            .ok()
            .flatten(),
        attachment,
    })
}

/// Parse a database row into a [`SummaryRecord`].
pub fn row_to_summary(row: &SqliteRow) -> Result<SummaryRecord, RepositoryError> {
    Ok(SummaryRecord {
        chat_id: row
            .try_get("chat_id")
            .map_err(|e| RepositoryError::Storage(e.to_string()))?,
        from_message_id: row
            .try_get("from_message_id")
            .map_err(|e| RepositoryError::Storage(e.to_string()))?,
        to_message_id: row
            .try_get("to_message_id")
            .map_err(|e| RepositoryError::Storage(e.to_string()))?,
        model: row
            .try_get("model")
            .map_err(|e| RepositoryError::Storage(e.to_string()))?,
        duration_ms: row
            .try_get("duration_ms")
            .map_err(|e| RepositoryError::Storage(e.to_string()))?,
        summary_text: row
            .try_get("summary_text")
            .map_err(|e| RepositoryError::Storage(e.to_string()))?,
        input_tokens: row
            .try_get("input_tokens")
            .map_err(|e| RepositoryError::Storage(e.to_string()))?,
        output_tokens: row
            .try_get("output_tokens")
            .map_err(|e| RepositoryError::Storage(e.to_string()))?,
        cost: row
            .try_get("cost")
            .map_err(|e| RepositoryError::Storage(e.to_string()))?,
    })
}
