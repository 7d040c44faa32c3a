//! Telegram Bot API wire types.
//!
//! Only the fields concisely reads are modelled; everything else in an
//! update is ignored on deserialization and survives only in the raw JSON.

use serde::Deserialize;

/// Envelope every Bot API method responds with.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl User {
    /// First and last name joined by a space.
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {last}", self.first_name),
            _ => self.first_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub file_unique_id: String,
    pub width: i64,
    pub height: i64,
    #[serde(default)]
    pub file_size: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sticker {
    pub file_id: String,
    pub file_unique_id: String,
    #[serde(default)]
    pub is_animated: bool,
    #[serde(default)]
    pub is_video: bool,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default, alias = "thumb")]
    pub thumbnail: Option<PhotoSize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Voice {
    pub file_id: String,
    pub file_unique_id: String,
    #[serde(default)]
    pub duration: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoNote {
    pub file_id: String,
    pub file_unique_id: String,
    #[serde(default)]
    pub duration: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    pub file_id: String,
    pub file_unique_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Animation {
    pub file_id: String,
    pub file_unique_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub file_id: String,
    pub file_unique_id: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollOption {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Poll {
    pub question: String,
    #[serde(default)]
    pub options: Vec<PollOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Where a forwarded message originally came from.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageOrigin {
    User { sender_user: User },
    HiddenUser { sender_user_name: String },
    Chat { sender_chat: Chat },
    Channel { chat: Chat },
    /// Origin kinds added to the Bot API after this was written.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    /// Unix time
    pub date: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub reply_to_message: Option<Box<Message>>,

    #[serde(default)]
    pub forward_origin: Option<MessageOrigin>,
    // Pre-7.0 forward fields, still sent by some servers
    #[serde(default)]
    pub forward_from: Option<User>,
    #[serde(default)]
    pub forward_sender_name: Option<String>,
    #[serde(default)]
    pub forward_from_chat: Option<Chat>,

    #[serde(default)]
    pub photo: Option<Vec<PhotoSize>>,
    #[serde(default)]
    pub sticker: Option<Sticker>,
    #[serde(default)]
    pub voice: Option<Voice>,
    #[serde(default)]
    pub video_note: Option<VideoNote>,
    #[serde(default)]
    pub video: Option<Video>,
    #[serde(default)]
    pub animation: Option<Animation>,
    #[serde(default)]
    pub document: Option<Document>,
    #[serde(default)]
    pub poll: Option<Poll>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub new_chat_members: Option<Vec<User>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct File {
    pub file_id: String,
    pub file_unique_id: String,
    #[serde(default)]
    pub file_size: Option<i64>,
    /// Present while the file is downloadable (at least an hour).
    #[serde(default)]
    pub file_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_name() {
        let user: User = serde_json::from_value(json!({
            "id": 1, "is_bot": false, "first_name": "Anna", "last_name": "Petrova"
        }))
        .unwrap();
        assert_eq!(user.full_name(), "Anna Petrova");

        let user: User = serde_json::from_value(json!({"id": 2, "first_name": "Boris"})).unwrap();
        assert_eq!(user.full_name(), "Boris");
    }

    #[test]
    fn test_message_ignores_unknown_fields() {
        let msg: Message = serde_json::from_value(json!({
            "message_id": 7,
            "date": 1_700_000_000,
            "chat": {"id": -100, "type": "supergroup", "title": "Friends"},
            "text": "hi",
            "entities": [{"type": "bold", "offset": 0, "length": 2}],
            "has_protected_content": true
        }))
        .unwrap();
        assert_eq!(msg.message_id, 7);
        assert_eq!(msg.chat.title.as_deref(), Some("Friends"));
    }

    #[test]
    fn test_forward_origin_variants() {
        let origin: MessageOrigin = serde_json::from_value(json!({
            "type": "hidden_user", "date": 1, "sender_user_name": "Secret"
        }))
        .unwrap();
        assert!(matches!(origin, MessageOrigin::HiddenUser { ref sender_user_name } if sender_user_name == "Secret"));

        let origin: MessageOrigin = serde_json::from_value(json!({
            "type": "channel", "date": 1, "message_id": 5,
            "chat": {"id": -1001, "type": "channel", "title": "News"}
        }))
        .unwrap();
        assert!(matches!(origin, MessageOrigin::Channel { .. }));
    }

    #[test]
    fn test_unknown_forward_origin_keeps_message() {
        let msg: Message = serde_json::from_value(json!({
            "message_id": 8,
            "date": 1_700_000_000,
            "chat": {"id": -100, "type": "supergroup"},
            "text": "fwd",
            "forward_origin": {"type": "future_kind", "date": 1, "something": {"id": 3}}
        }))
        .unwrap();
        assert!(matches!(msg.forward_origin, Some(MessageOrigin::Unknown)));
        assert_eq!(msg.text.as_deref(), Some("fwd"));
    }

    #[test]
    fn test_legacy_sticker_thumb_alias() {
        let sticker: Sticker = serde_json::from_value(json!({
            "file_id": "s", "file_unique_id": "u", "is_animated": true,
            "thumb": {"file_id": "t", "file_unique_id": "tu", "width": 128, "height": 128}
        }))
        .unwrap();
        assert_eq!(sticker.thumbnail.unwrap().file_id, "t");
    }

    #[test]
    fn test_error_envelope() {
        let resp: ApiResponse<File> = serde_json::from_value(json!({
            "ok": false, "error_code": 400, "description": "Bad Request: file is too big"
        }))
        .unwrap();
        assert!(!resp.ok);
        assert!(resp.result.is_none());
        assert_eq!(resp.error_code, Some(400));
    }
}
