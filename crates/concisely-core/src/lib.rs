//! Core domain types, ports and services for the concisely chat summarizer.
//!
//! This crate has no infrastructure dependencies. Storage, the Telegram Bot
//! API, the LLM provider and `ffmpeg` are all reached through the traits in
//! [`ports`]; adapters live in sibling crates and are wired together by the
//! `concisely` binary.

pub mod domain;
pub mod error;
pub mod html;
pub mod ports;
pub mod prompt;
pub mod services;
pub mod wide_log;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types for convenience
pub use domain::{
    Attachment, ChatMessage, ChatSettings, ChatSettingsError, DEFAULT_SUMMARY_INTERVAL,
    IncomingMessage, MediaSource, NewChatMessage, SummaryRecord,
};
pub use error::CoreError;
pub use html::fix_html;
pub use ports::{
    AudioTranscoder, ChatGateway, ChatStateRepository, Completion, Description, GatewayError,
    LlmError, LlmPort, MediaPayload, MessageRepository, ModelRoster, ParseMode, Repos,
    RepositoryError, StickerCacheRepository, SummaryRepository, TranscodeError, WideLogSink,
};
pub use prompt::{SUMMARIZATION_PROMPT, format_message, full_prompt, model_short_name, transcript};
pub use services::{IngestService, MediaDescriber, SummaryOutcome, SummaryService, SkipReason};
pub use wide_log::{Timings, WideLogRecord, elapsed_ms};
