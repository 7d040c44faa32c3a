//! `SQLite` storage for concisely.
//!
//! Implements the repository ports from `concisely-core` on top of `sqlx`.
//! Entry points call [`setup_database`] once and hand the pool to
//! [`CoreFactory::build_repos`].

#![deny(unsafe_code)]

pub mod factory;
pub mod repositories;
pub mod setup;

// Re-export factory for convenient access
pub use factory::CoreFactory;

// Re-export TestDb for integration tests
#[cfg(any(test, feature = "test-utils"))]
pub use factory::TestDb;

// Re-export repository implementations
pub use repositories::{
    SqliteChatStateRepository, SqliteMessageRepository, SqliteStickerCacheRepository,
    SqliteSummaryRepository,
};

// Pool type, so callers can hold and close it without depending on sqlx
pub use sqlx::SqlitePool;

// Re-export setup functions for convenient access
pub use setup::setup_database;
#[cfg(any(test, feature = "test-utils"))]
pub use setup::setup_test_database;
