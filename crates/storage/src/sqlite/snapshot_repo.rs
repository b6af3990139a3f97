use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::repository::{SNAPSHOT_KEY, SnapshotRepository, StorageError};

use super::SqliteRepository;

#[async_trait]
impl SnapshotRepository for SqliteRepository {
    async fn load_snapshot(&self) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT body FROM snapshots WHERE key = ?1")
            .bind(SNAPSHOT_KEY)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        row.map(|row| row.try_get::<String, _>("body"))
            .transpose()
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    async fn save_snapshot(&self, body: &str) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO snapshots (key, body, saved_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                body = excluded.body,
                saved_at = excluded.saved_at
            ",
        )
        .bind(SNAPSHOT_KEY)
        .bind(body)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn clear_snapshot(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM snapshots WHERE key = ?1")
            .bind(SNAPSHOT_KEY)
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
