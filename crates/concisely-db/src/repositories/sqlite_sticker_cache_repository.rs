//! `SQLite` implementation of the `StickerCacheRepository` trait.

use async_trait::async_trait;
use sqlx::SqlitePool;

use concisely_core::{RepositoryError, StickerCacheRepository};

pub struct SqliteStickerCacheRepository {
    pool: SqlitePool,
}

impl SqliteStickerCacheRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StickerCacheRepository for SqliteStickerCacheRepository {
    async fn sticker_description(
        &self,
        file_unique_id: &str,
    ) -> Result<Option<String>, RepositoryError> {
        sqlx::query_scalar("SELECT description FROM sticker_descriptions WHERE file_unique_id = ?")
            .bind(file_unique_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))
    }

    async fn save_sticker_description(
        &self,
        file_unique_id: &str,
        description: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT OR REPLACE INTO sticker_descriptions (file_unique_id, description) VALUES (?, ?)",
        )
        .bind(file_unique_id)
        .bind(description)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        Ok(())
    }
}
