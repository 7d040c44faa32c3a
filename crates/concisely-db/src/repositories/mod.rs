//! Repository implementations using `SQLite`.
//!
//! These implementations encapsulate all SQL queries and database access.
//! The `SqlitePool` is confined to this module and never exposed through
//! the port trait signatures.

mod row_mappers;
mod sqlite_chat_state_repository;
mod sqlite_message_repository;
mod sqlite_sticker_cache_repository;
mod sqlite_summary_repository;

pub use sqlite_chat_state_repository::SqliteChatStateRepository;
pub use sqlite_message_repository::SqliteMessageRepository;
pub use sqlite_sticker_cache_repository::SqliteStickerCacheRepository;
pub use sqlite_summary_repository::SqliteSummaryRepository;
