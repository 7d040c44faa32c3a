//! Chat message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::attachment::{Attachment, MediaSource};

/// A message as received from the chat platform, before persistence.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub message_id: i64,
    pub sender_id: Option<i64>,
    pub sender_name: String,
    /// Message text, falling back to the media caption.
    pub text: String,
    pub reply_to_message_id: Option<i64>,
    pub forward_sender_name: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    /// Raw update payload, kept verbatim for the wide log and storage.
    pub raw: serde_json::Value,
    pub attachment: Option<Attachment>,
    pub media: Option<MediaSource>,
}

impl IncomingMessage {
    /// Correlation id used in logs: `"{chat_id}:{message_id}"`.
    pub fn request_id(&self) -> String {
        format!("{}:{}", self.chat_id, self.message_id)
    }

    /// Persisted form of this message.
    pub fn to_new_message(&self) -> NewChatMessage {
        NewChatMessage {
            chat_id: self.chat_id,
            message_id: self.message_id,
            sender_id: self.sender_id,
            sender_name: self.sender_name.clone(),
            text: self.text.clone(),
            reply_to_message_id: self.reply_to_message_id,
            forward_sender_name: self.forward_sender_name.clone(),
            timestamp: self.timestamp,
            raw: self.raw.clone(),
            attachment: self.attachment.clone(),
        }
    }
}

/// Data for persisting a message.
#[derive(Debug, Clone)]
pub struct NewChatMessage {
    pub chat_id: i64,
    pub message_id: i64,
    pub sender_id: Option<i64>,
    pub sender_name: String,
    pub text: String,
    pub reply_to_message_id: Option<i64>,
    pub forward_sender_name: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub raw: serde_json::Value,
    pub attachment: Option<Attachment>,
}

/// A stored chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub chat_id: i64,
    pub message_id: i64,
    pub sender_id: Option<i64>,
    pub sender_name: String,
    pub text: String,
    pub reply_to_message_id: Option<i64>,
    pub forward_sender_name: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub attachment: Option<Attachment>,
}

impl ChatMessage {
    /// Minimal text message, mostly useful for tests and tooling.
    pub fn text(chat_id: i64, message_id: i64, sender: &str, text: &str) -> Self {
        Self {
            chat_id,
            message_id,
            sender_id: None,
            sender_name: sender.to_string(),
            text: text.to_string(),
            reply_to_message_id: None,
            forward_sender_name: None,
            timestamp: None,
            attachment: None,
        }
    }
}

impl From<NewChatMessage> for ChatMessage {
    fn from(msg: NewChatMessage) -> Self {
        Self {
            chat_id: msg.chat_id,
            message_id: msg.message_id,
            sender_id: msg.sender_id,
            sender_name: msg.sender_name,
            text: msg.text,
            reply_to_message_id: msg.reply_to_message_id,
            forward_sender_name: msg.forward_sender_name,
            timestamp: msg.timestamp,
            attachment: msg.attachment,
        }
    }
}
