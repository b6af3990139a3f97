use async_trait::async_trait;
use gearup_core::model::CompletionRecord;
use sqlx::Row;

use crate::repository::{CompletionSink, StorageError};

use super::SqliteRepository;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[async_trait]
impl CompletionSink for SqliteRepository {
    async fn record_completion(&self, record: &CompletionRecord) -> Result<(), StorageError> {
        let body = serde_json::to_string(record).map_err(ser)?;

        sqlx::query(
            r"
            INSERT INTO completions (version, season_label, started_at, completed_at, body)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(started_at, completed_at) DO UPDATE SET
                version = excluded.version,
                season_label = excluded.season_label,
                body = excluded.body
            ",
        )
        .bind(record.version.as_str())
        .bind(record.season_label.as_str())
        .bind(record.started_at)
        .bind(record.completed_at)
        .bind(body)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}

impl SqliteRepository {
    /// All recorded completions, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails or a stored body no longer
    /// decodes.
    pub async fn completions(&self) -> Result<Vec<CompletionRecord>, StorageError> {
        let rows = sqlx::query("SELECT body FROM completions ORDER BY completed_at ASC, id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        rows.iter()
            .map(|row| {
                let body: String = row.try_get("body").map_err(ser)?;
                serde_json::from_str(&body).map_err(ser)
            })
            .collect()
    }
}
