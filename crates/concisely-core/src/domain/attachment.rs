//! Message attachments.

use serde::{Deserialize, Serialize};

/// Non-text content of a chat message.
///
/// Serialized with a `"type"` tag so stored rows stay readable, e.g.
/// `{"type":"sticker","emoji":"🙂"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Attachment {
    Photo {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Voice {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    VideoNote {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Video,
    Animation,
    Sticker {
        #[serde(default)]
        emoji: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Document {
        #[serde(default)]
        file_name: String,
    },
    Poll {
        question: String,
        #[serde(default)]
        options: Vec<String>,
    },
    Location,
    NewMembers {
        names: String,
    },
}

impl Attachment {
    /// Wire name of the attachment kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Photo { .. } => "photo",
            Self::Voice { .. } => "voice",
            Self::VideoNote { .. } => "video_note",
            Self::Video => "video",
            Self::Animation => "animation",
            Self::Sticker { .. } => "sticker",
            Self::Document { .. } => "document",
            Self::Poll { .. } => "poll",
            Self::Location => "location",
            Self::NewMembers { .. } => "new_members",
        }
    }

    /// Description produced by the media describer, if any.
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Photo { description }
            | Self::Voice { description }
            | Self::VideoNote { description }
            | Self::Sticker { description, .. } => description.as_deref(),
            _ => None,
        }
    }

    /// Store a description. Returns `false` for kinds that carry none.
    pub fn set_description(&mut self, text: String) -> bool {
        match self {
            Self::Photo { description }
            | Self::Voice { description }
            | Self::VideoNote { description }
            | Self::Sticker { description, .. } => {
                *description = Some(text);
                true
            }
            _ => false,
        }
    }
}

/// Where to download the payload of a describable attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Largest available photo size.
    Photo { file_id: String },
    Sticker {
        file_id: String,
        file_unique_id: String,
        /// Animated (TGS) and video (WEBM) stickers can't be sent to the
        /// image model directly; their thumbnail is used instead.
        animated: bool,
        thumbnail_file_id: Option<String>,
    },
    VideoNote { file_id: String },
    /// OGG/Opus voice note.
    Voice { file_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_type_tag() {
        let att = Attachment::Sticker {
            emoji: "🙂".to_string(),
            description: None,
        };
        let json = serde_json::to_value(&att).unwrap();
        assert_eq!(json, serde_json::json!({"type": "sticker", "emoji": "🙂"}));

        let back: Attachment = serde_json::from_value(json).unwrap();
        assert_eq!(back, att);
    }

    #[test]
    fn test_new_members_uses_snake_case_tag() {
        let att = Attachment::NewMembers {
            names: "Ann, Bob".to_string(),
        };
        let json = serde_json::to_value(&att).unwrap();
        assert_eq!(json["type"], "new_members");
        assert_eq!(att.kind(), "new_members");
    }

    #[test]
    fn test_set_description_only_on_describable_kinds() {
        let mut photo = Attachment::Photo { description: None };
        assert!(photo.set_description("a cat".to_string()));
        assert_eq!(photo.description(), Some("a cat"));

        let mut video = Attachment::Video;
        assert!(!video.set_description("ignored".to_string()));
        assert_eq!(video.description(), None);
    }
}
