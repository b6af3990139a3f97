//! Completion "download": writes each record as a pretty-printed JSON file.

use async_trait::async_trait;
use gearup_core::model::CompletionRecord;
use std::path::PathBuf;

use crate::repository::{CompletionSink, StorageError};

/// Writes completion records into a directory, one file per completion,
/// named by [`CompletionRecord::file_name`].
#[derive(Debug, Clone)]
pub struct JsonDirectoryExporter {
    dir: PathBuf,
}

impl JsonDirectoryExporter {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn path_for(&self, record: &CompletionRecord) -> PathBuf {
        self.dir.join(record.file_name())
    }
}

#[async_trait]
impl CompletionSink for JsonDirectoryExporter {
    async fn record_completion(&self, record: &CompletionRecord) -> Result<(), StorageError> {
        let body = record
            .to_json_pretty()
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(record);
        tokio::fs::write(&path, body).await?;
        tracing::info!(path = %path.display(), "exported completion record");
        Ok(())
    }
}
