use std::sync::Arc;

use gearup_core::model::{Catalog, Session};
use gearup_core::snapshot::{self, RestoreSource};
use gearup_core::{Action, NavigationController, Outcome, StepTable, Transition, WizardConfig};
use storage::repository::{CompletionSink, SnapshotRepository};
use tracing::{debug, info, warn};

use crate::Clock;
use crate::error::OnboardingError;
use crate::gate_ticker::Ticks;

/// Loads the wizard from storage and keeps storage in step with it.
///
/// The controller itself stays synchronous; this service wraps each action
/// with the persistence it implies: a snapshot save after every mutating
/// transition, a cleared slot on restart, and a completion record once the
/// terminal step is confirmed.
#[derive(Clone)]
pub struct OnboardingService {
    clock: Clock,
    config: WizardConfig,
    catalog: Catalog,
    snapshots: Arc<dyn SnapshotRepository>,
    completions: Arc<dyn CompletionSink>,
}

impl OnboardingService {
    #[must_use]
    pub fn new(
        clock: Clock,
        config: WizardConfig,
        snapshots: Arc<dyn SnapshotRepository>,
        completions: Arc<dyn CompletionSink>,
    ) -> Self {
        Self {
            clock,
            config,
            catalog: Catalog::standard(),
            snapshots,
            completions,
        }
    }

    #[must_use]
    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    /// Builds the controller from whatever snapshot is stored.
    ///
    /// Unreadable storage and damaged snapshots degrade to defaults; the
    /// failure is logged, never returned. Changes made while entering the
    /// resumed step are saved straight away.
    pub async fn resume(&self) -> NavigationController {
        let raw = match self.snapshots.load_snapshot().await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "failed to load snapshot, starting fresh");
                None
            }
        };

        let defaults = Session::new(self.clock.now());
        let restored = snapshot::restore(
            raw.as_deref(),
            defaults,
            &self.catalog,
            StepTable::standard().len(),
        );
        match restored.source {
            RestoreSource::Fresh => info!("starting a new gear-up session"),
            RestoreSource::Restored => info!(
                step_index = restored.session.step_index(),
                "resumed saved session"
            ),
            RestoreSource::Recovered => warn!(
                step_index = restored.session.step_index(),
                "stored snapshot was damaged, recovered what could be read"
            ),
        }

        let loaded = restored.session.clone();
        let nav = NavigationController::resume_at(
            restored.session,
            self.config.clone(),
            self.clock,
            self.catalog.clone(),
        );
        // Entering the resumed step can latch a zero-length gate.
        if nav.session() != &loaded {
            if let Err(err) = self.save(nav.session()).await {
                warn!(error = %err, "failed to save resumed session");
            }
        }
        nav
    }

    /// Applies `action` without touching storage. Pair with [`Self::persist`].
    pub fn apply(&self, nav: &mut NavigationController, action: Action) -> Transition {
        let transition = nav.apply(action);
        log_transition(&transition);
        transition
    }

    /// Writes whatever `transition` implies for storage.
    ///
    /// A failed snapshot write is logged and otherwise ignored so the wizard
    /// keeps working without storage. A failed completion export is returned;
    /// confirming the terminal step again re-emits the same record.
    ///
    /// # Errors
    ///
    /// Returns `OnboardingError::Storage` if the completion record cannot be
    /// recorded.
    pub async fn persist(
        &self,
        transition: &Transition,
        session: &Session,
    ) -> Result<(), OnboardingError> {
        if matches!(transition.outcome, Outcome::Restarted) {
            if let Err(err) = self.snapshots.clear_snapshot().await {
                warn!(error = %err, "failed to clear snapshot on restart");
            }
        }
        if transition.mutated() {
            if let Err(err) = self.save(session).await {
                warn!(error = %err, "failed to save snapshot");
            }
        }
        if let Some(record) = transition.completion() {
            self.completions.record_completion(record).await?;
            info!(
                completed_at = %record.completed_at,
                season = %record.season_label,
                "recorded completion"
            );
        }
        Ok(())
    }

    /// Applies `action` and persists the result.
    ///
    /// # Errors
    ///
    /// Returns `OnboardingError` if the completion record cannot be recorded.
    pub async fn dispatch(
        &self,
        nav: &mut NavigationController,
        action: Action,
    ) -> Result<Transition, OnboardingError> {
        let transition = self.apply(nav, action);
        self.persist(&transition, nav.session()).await?;
        Ok(transition)
    }

    /// Encodes and stores `session`.
    ///
    /// # Errors
    ///
    /// Returns `OnboardingError` if encoding or the write fails.
    pub async fn save(&self, session: &Session) -> Result<(), OnboardingError> {
        let body = snapshot::encode(session)?;
        self.snapshots.save_snapshot(&body).await?;
        Ok(())
    }

    /// Feeds `ticks` into the controller until the video gate stops running,
    /// persisting the unlock.
    ///
    /// Returns immediately when no countdown is running.
    ///
    /// # Errors
    ///
    /// Returns `OnboardingError` if persisting a transition fails.
    pub async fn run_gate(
        &self,
        nav: &mut NavigationController,
        ticks: &mut Ticks,
    ) -> Result<(), OnboardingError> {
        while nav.gate().is_running() {
            ticks.next().await;
            self.dispatch(nav, Action::Tick).await?;
        }
        Ok(())
    }
}

fn log_transition(transition: &Transition) {
    match &transition.outcome {
        Outcome::Advanced { from, to } => info!(from, to, "advanced"),
        Outcome::Retreated { from, to } => info!(from, to, "went back"),
        Outcome::Restarted => info!("restarted"),
        Outcome::Completed(record) => info!(completed_at = %record.completed_at, "completed"),
        Outcome::Vetoed => info!(notices = transition.notices.len(), "advance vetoed"),
        Outcome::Blocked => debug!("advance blocked"),
        Outcome::Rejected(err) => debug!(error = %err, "action rejected"),
        Outcome::Ticked { remaining } => debug!(remaining, "gate tick"),
        Outcome::GateUnlocked => info!("video gate unlocked"),
        Outcome::Updated | Outcome::Unchanged => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gearup_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn service(repo: &InMemoryRepository) -> OnboardingService {
        OnboardingService::new(
            fixed_clock(),
            WizardConfig::default(),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        )
    }

    #[tokio::test]
    async fn unchanged_transitions_are_not_saved() {
        let repo = InMemoryRepository::new();
        let service = service(&repo);
        let mut nav = service.resume().await;

        service.dispatch(&mut nav, Action::Retreat).await.unwrap();
        service.dispatch(&mut nav, Action::Advance).await.unwrap();
        assert_eq!(repo.load_snapshot().await.unwrap(), None);
    }

    #[tokio::test]
    async fn mutation_is_saved_and_resumed() {
        let repo = InMemoryRepository::new();
        let service = service(&repo);
        let mut nav = service.resume().await;

        service
            .dispatch(
                &mut nav,
                Action::Select {
                    field: "intent".into(),
                    value: "probably".into(),
                },
            )
            .await
            .unwrap();

        let resumed = service.resume().await;
        assert_eq!(resumed.session().answers().intent(), Some("probably"));
    }
}
