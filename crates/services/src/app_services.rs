use std::path::PathBuf;
use std::sync::Arc;

use gearup_core::WizardConfig;
use storage::json_dir::JsonDirectoryExporter;
use storage::repository::Storage;

use crate::error::AppServicesError;
use crate::gate_ticker::GateTicker;
use crate::onboarding::OnboardingService;
use crate::Clock;

/// Assembles the app-facing services over a chosen storage backend.
#[derive(Clone)]
pub struct AppServices {
    onboarding: Arc<OnboardingService>,
    ticker: GateTicker,
}

impl AppServices {
    /// Build services backed by `SQLite` storage, optionally also writing
    /// completion records as JSON files into `export_dir`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        config: WizardConfig,
        export_dir: Option<PathBuf>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, clock, config, export_dir))
    }

    /// Build services over in-memory storage; nothing survives the process.
    #[must_use]
    pub fn in_memory(clock: Clock, config: WizardConfig) -> Self {
        Self::from_storage(Storage::in_memory(), clock, config, None)
    }

    #[must_use]
    pub fn from_storage(
        storage: Storage,
        clock: Clock,
        config: WizardConfig,
        export_dir: Option<PathBuf>,
    ) -> Self {
        let storage = match export_dir {
            Some(dir) => {
                tracing::info!(dir = %dir.display(), "exporting completion records");
                storage.with_extra_sink(Arc::new(JsonDirectoryExporter::new(dir)))
            }
            None => storage,
        };
        let onboarding = Arc::new(OnboardingService::new(
            clock,
            config,
            Arc::clone(&storage.snapshots),
            Arc::clone(&storage.completions),
        ));
        Self {
            onboarding,
            ticker: GateTicker::new(),
        }
    }

    #[must_use]
    pub fn with_ticker(mut self, ticker: GateTicker) -> Self {
        self.ticker = ticker;
        self
    }

    #[must_use]
    pub fn onboarding(&self) -> Arc<OnboardingService> {
        Arc::clone(&self.onboarding)
    }

    #[must_use]
    pub fn ticker(&self) -> GateTicker {
        self.ticker
    }
}
