//! Conversion from wire messages to core [`IncomingMessage`]s.

use chrono::DateTime;
use concisely_core::{Attachment, IncomingMessage, MediaSource};

use crate::wire::{Message, MessageOrigin};

/// Sender name used for messages without a human author (joins, pins...).
const SERVICE_SENDER: &str = "Service";

/// Convert a wire message, keeping `raw` as the verbatim payload.
pub fn into_incoming(msg: &Message, raw: serde_json::Value) -> IncomingMessage {
    let (attachment, media) = attachment_of(msg).map_or((None, None), |(a, m)| (Some(a), m));

    IncomingMessage {
        chat_id: msg.chat.id,
        message_id: msg.message_id,
        sender_id: msg.from.as_ref().map(|u| u.id),
        sender_name: sender_name(msg),
        text: message_text(msg),
        reply_to_message_id: msg.reply_to_message.as_ref().map(|m| m.message_id),
        forward_sender_name: forward_sender_name(msg),
        timestamp: DateTime::from_timestamp(msg.date, 0),
        raw,
        attachment,
        media,
    }
}

fn message_text(msg: &Message) -> String {
    msg.text
        .as_ref()
        .or(msg.caption.as_ref())
        .cloned()
        .unwrap_or_default()
}

fn sender_name(msg: &Message) -> String {
    msg.from
        .as_ref()
        .map(crate::wire::User::full_name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| SERVICE_SENDER.to_string())
}

/// Display name of a forward's origin.
fn forward_sender_name(msg: &Message) -> Option<String> {
    match &msg.forward_origin {
        Some(MessageOrigin::User { sender_user }) => {
            return Some(sender_user.full_name()).filter(|name| !name.is_empty());
        }
        Some(MessageOrigin::HiddenUser { sender_user_name }) => {
            return Some(sender_user_name.clone()).filter(|name| !name.is_empty());
        }
        Some(MessageOrigin::Chat { sender_chat: chat } | MessageOrigin::Channel { chat }) => {
            return chat.title.clone().filter(|name| !name.is_empty());
        }
        // Unrecognized origins fall back to the legacy fields
        Some(MessageOrigin::Unknown) | None => {}
    }

    if let Some(user) = &msg.forward_from {
        return Some(user.full_name()).filter(|name| !name.is_empty());
    }
    if let Some(name) = &msg.forward_sender_name {
        return Some(name.clone());
    }
    msg.forward_from_chat.as_ref().and_then(|c| c.title.clone())
}

/// The message's attachment and, for describable kinds, where to fetch it.
fn attachment_of(msg: &Message) -> Option<(Attachment, Option<MediaSource>)> {
    if msg.animation.is_some() {
        // Animations also carry a `document`; check them first
        return Some((Attachment::Animation, None));
    }
    if let Some(sizes) = &msg.photo {
        // Sizes are ascending; describe the largest
        let media = sizes.last().map(|p| MediaSource::Photo {
            file_id: p.file_id.clone(),
        });
        return Some((Attachment::Photo { description: None }, media));
    }
    if let Some(voice) = &msg.voice {
        return Some((
            Attachment::Voice { description: None },
            Some(MediaSource::Voice {
                file_id: voice.file_id.clone(),
            }),
        ));
    }
    if let Some(note) = &msg.video_note {
        return Some((
            Attachment::VideoNote { description: None },
            Some(MediaSource::VideoNote {
                file_id: note.file_id.clone(),
            }),
        ));
    }
    if let Some(sticker) = &msg.sticker {
        return Some((
            Attachment::Sticker {
                emoji: sticker.emoji.clone().unwrap_or_default(),
                description: None,
            },
            Some(MediaSource::Sticker {
                file_id: sticker.file_id.clone(),
                file_unique_id: sticker.file_unique_id.clone(),
                animated: sticker.is_animated || sticker.is_video,
                thumbnail_file_id: sticker.thumbnail.as_ref().map(|t| t.file_id.clone()),
            }),
        ));
    }
    if msg.video.is_some() {
        return Some((Attachment::Video, None));
    }
    if let Some(doc) = &msg.document {
        return Some((
            Attachment::Document {
                file_name: doc.file_name.clone().unwrap_or_default(),
            },
            None,
        ));
    }
    if let Some(poll) = &msg.poll {
        return Some((
            Attachment::Poll {
                question: poll.question.clone(),
                options: poll.options.iter().map(|o| o.text.clone()).collect(),
            },
            None,
        ));
    }
    if msg.location.is_some() {
        return Some((Attachment::Location, None));
    }
    if let Some(members) = &msg.new_chat_members {
        let names = members
            .iter()
            .map(crate::wire::User::full_name)
            .collect::<Vec<_>>()
            .join(", ");
        return Some((Attachment::NewMembers { names }, None));
    }
    None
}
