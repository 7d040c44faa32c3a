//! Core domain types.
//!
//! These types represent the pure domain model, independent of any
//! infrastructure concerns (database, Telegram wire format, etc.).
//!
//! # Structure
//!
//! - `attachment` - What a message carries besides text, and where to fetch it
//! - `message` - Incoming and persisted chat messages
//! - `chat` - Per-chat summary settings
//! - `summary` - Generated summary records

mod attachment;
mod chat;
mod message;
mod summary;

pub use attachment::{Attachment, MediaSource};
pub use chat::{ChatSettings, ChatSettingsError, DEFAULT_SUMMARY_INTERVAL};
pub use message::{ChatMessage, IncomingMessage, NewChatMessage};
pub use summary::SummaryRecord;
