//! Shared error types for the services crate.

use thiserror::Error;

use gearup_core::SnapshotError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `OnboardingService` persistence.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OnboardingError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
