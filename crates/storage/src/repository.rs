use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gearup_core::model::CompletionRecord;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Key under which the single wizard snapshot is stored.
pub const SNAPSHOT_KEY: &str = "vesl_gearup_v1";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Repository contract for the persisted wizard snapshot.
///
/// Snapshots are opaque JSON text here; decoding and the merge over
/// defaults happen in the domain crate so a damaged record never fails a
/// load.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Fetch the stored snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn load_snapshot(&self) -> Result<Option<String>, StorageError>;

    /// Persist or replace the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save_snapshot(&self, body: &str) -> Result<(), StorageError>;

    /// Remove the stored snapshot. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn clear_snapshot(&self) -> Result<(), StorageError>;
}

/// Destination for completion records.
///
/// Recording the same completion twice (same `startedAt`/`completedAt`)
/// replaces the earlier copy instead of adding a second one.
#[async_trait]
pub trait CompletionSink: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be written.
    async fn record_completion(&self, record: &CompletionRecord) -> Result<(), StorageError>;
}

type CompletionKey = (DateTime<Utc>, DateTime<Utc>);

fn completion_key(record: &CompletionRecord) -> CompletionKey {
    (record.started_at, record.completed_at)
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    snapshot: Arc<Mutex<Option<String>>>,
    completions: Arc<Mutex<BTreeMap<CompletionKey, CompletionRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded completions ordered by start then completion time.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn completions(&self) -> Result<Vec<CompletionRecord>, StorageError> {
        let guard = self
            .completions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.values().cloned().collect())
    }
}

#[async_trait]
impl SnapshotRepository for InMemoryRepository {
    async fn load_snapshot(&self) -> Result<Option<String>, StorageError> {
        let guard = self
            .snapshot
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_snapshot(&self, body: &str) -> Result<(), StorageError> {
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(body.to_owned());
        Ok(())
    }

    async fn clear_snapshot(&self) -> Result<(), StorageError> {
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}

#[async_trait]
impl CompletionSink for InMemoryRepository {
    async fn record_completion(&self, record: &CompletionRecord) -> Result<(), StorageError> {
        let mut guard = self
            .completions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(completion_key(record), record.clone());
        Ok(())
    }
}

/// Forwards each completion to every inner sink in order, stopping at the
/// first failure.
#[derive(Clone, Default)]
pub struct FanOutSink {
    sinks: Vec<Arc<dyn CompletionSink>>,
}

impl FanOutSink {
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn CompletionSink>>) -> Self {
        Self { sinks }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl CompletionSink for FanOutSink {
    async fn record_completion(&self, record: &CompletionRecord) -> Result<(), StorageError> {
        for sink in &self.sinks {
            sink.record_completion(record).await?;
        }
        Ok(())
    }
}

/// Aggregates the snapshot store and completion sink behind trait objects for
/// easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub snapshots: Arc<dyn SnapshotRepository>,
    pub completions: Arc<dyn CompletionSink>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let snapshots: Arc<dyn SnapshotRepository> = Arc::new(repo.clone());
        let completions: Arc<dyn CompletionSink> = Arc::new(repo);
        Self {
            snapshots,
            completions,
        }
    }

    /// Also hand every completion to `sink`, after the current one.
    #[must_use]
    pub fn with_extra_sink(self, sink: Arc<dyn CompletionSink>) -> Self {
        let completions: Arc<dyn CompletionSink> =
            Arc::new(FanOutSink::new(vec![self.completions, sink]));
        Self {
            snapshots: self.snapshots,
            completions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gearup_core::model::Session;
    use gearup_core::time::fixed_clock;
    use gearup_core::{Action, NavigationController, WizardConfig};

    fn finished_record() -> CompletionRecord {
        let config = WizardConfig::default().with_video_url("").unwrap();
        let mut nav = NavigationController::new(config, fixed_clock());
        for action in [
            Action::Select {
                field: "intent".into(),
                value: "lets_go".into(),
            },
            Action::Select {
                field: "frequency".into(),
                value: "most_weeks".into(),
            },
            Action::Advance,
            Action::AcknowledgeVideo,
            Action::Advance,
            Action::Advance,
            Action::Advance,
            Action::ToggleMultiLimited {
                field: "playstyle".into(),
                value: "builder".into(),
            },
            Action::Select {
                field: "motivation".into(),
                value: "new".into(),
            },
            Action::Advance,
            Action::ToggleExclusive {
                field: "blockers".into(),
                value: "none".into(),
            },
            Action::Select {
                field: "helpConfidence".into(),
                value: "yes".into(),
            },
            Action::Advance,
            Action::ConfirmReady,
            Action::Advance,
        ] {
            nav.apply(action);
        }
        nav.completion_record().unwrap()
    }

    #[tokio::test]
    async fn snapshot_save_load_clear() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.load_snapshot().await.unwrap(), None);

        let body = gearup_core::snapshot::encode(&Session::new(fixed_clock().now())).unwrap();
        repo.save_snapshot(&body).await.unwrap();
        assert_eq!(repo.load_snapshot().await.unwrap(), Some(body));

        repo.clear_snapshot().await.unwrap();
        repo.clear_snapshot().await.unwrap();
        assert_eq!(repo.load_snapshot().await.unwrap(), None);
    }

    #[tokio::test]
    async fn repeated_completion_is_stored_once() {
        let repo = InMemoryRepository::new();
        let record = finished_record();
        repo.record_completion(&record).await.unwrap();
        repo.record_completion(&record).await.unwrap();

        let stored = repo.completions().unwrap();
        assert_eq!(stored, vec![record]);
    }

    #[tokio::test]
    async fn extra_sink_receives_every_completion() {
        let extra = InMemoryRepository::new();
        let storage = Storage::in_memory().with_extra_sink(Arc::new(extra.clone()));

        let record = finished_record();
        storage.completions.record_completion(&record).await.unwrap();
        assert_eq!(extra.completions().unwrap().len(), 1);
    }
}
