//! Composition utilities for building repositories with `SQLite` backends.
//!
//! Construction only; no domain logic lives here.

use sqlx::SqlitePool;
use std::sync::Arc;

use concisely_core::Repos;

use crate::repositories::{
    SqliteChatStateRepository, SqliteMessageRepository, SqliteStickerCacheRepository,
    SqliteSummaryRepository,
};

/// Factory for creating repository instances with `SQLite` backends.
pub struct CoreFactory;

impl CoreFactory {
    /// Build all `SQLite` repositories from a pool.
    ///
    /// This is the recommended way for adapters to obtain repositories.
    pub fn build_repos(pool: SqlitePool) -> Repos {
        Repos::new(
            Arc::new(SqliteMessageRepository::new(pool.clone())),
            Arc::new(SqliteChatStateRepository::new(pool.clone())),
            Arc::new(SqliteStickerCacheRepository::new(pool.clone())),
            Arc::new(SqliteSummaryRepository::new(pool)),
        )
    }

    /// Create a message repository from a pool.
    pub fn message_repository(pool: SqlitePool) -> Arc<SqliteMessageRepository> {
        Arc::new(SqliteMessageRepository::new(pool))
    }
}

/// Test database helper for integration tests.
///
/// Provides an in-memory `SQLite` database with the production schema.
#[cfg(any(test, feature = "test-utils"))]
pub struct TestDb {
    pool: SqlitePool,
}

#[cfg(any(test, feature = "test-utils"))]
impl TestDb {
    /// Create a new in-memory test database with full schema.
    pub async fn new() -> anyhow::Result<Self> {
        let pool = crate::setup::setup_test_database().await?;
        Ok(Self { pool })
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// All repositories over this database.
    pub fn repos(&self) -> Repos {
        CoreFactory::build_repos(self.pool.clone())
    }
}
