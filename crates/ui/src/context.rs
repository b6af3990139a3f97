use std::sync::Arc;

use services::{GateTicker, OnboardingService};

pub trait UiApp: Send + Sync {
    fn onboarding(&self) -> Arc<OnboardingService>;
    fn ticker(&self) -> GateTicker;
}

#[derive(Clone)]
pub struct AppContext {
    onboarding: Arc<OnboardingService>,
    ticker: GateTicker,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            onboarding: app.onboarding(),
            ticker: app.ticker(),
        }
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

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
