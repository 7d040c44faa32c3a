//! Generated summary records.

use serde::{Deserialize, Serialize};

/// One summary that was generated and posted to a chat.
///
/// Covers messages in the half-open range `(from_message_id, to_message_id]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub chat_id: i64,
    pub from_message_id: i64,
    pub to_message_id: i64,
    pub model: String,
    pub duration_ms: f64,
    pub summary_text: String,
    pub input_tokens: Option<i64>,
    pub output_tokens: Option<i64>,
    pub cost: Option<f64>,
}
