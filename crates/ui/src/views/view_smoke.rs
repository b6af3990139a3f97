use std::sync::Arc;

use async_trait::async_trait;
use gearup_core::model::{Catalog, CompletionRecord, Session};
use gearup_core::snapshot;
use gearup_core::time::{fixed_clock, fixed_now};
use gearup_core::{Action, NavigationController, StepTable, WizardConfig};
use services::{GateTicker, OnboardingService};
use storage::repository::{CompletionSink, InMemoryRepository, SnapshotRepository, StorageError};

use super::test_harness::{
    WizardHarness, fast_ticker, in_memory_service, setup_wizard_harness,
};

fn select(field: &str, value: &str) -> Action {
    Action::Select {
        field: field.into(),
        value: value.into(),
    }
}

async fn stored_session(repo: &InMemoryRepository) -> Option<Session> {
    let raw = repo.load_snapshot().await.expect("load snapshot")?;
    let restored = snapshot::restore(
        Some(&raw),
        Session::new(fixed_now()),
        &Catalog::standard(),
        StepTable::standard().len(),
    );
    Some(restored.session)
}

/// Walks the rendered wizard from the video step to the ready step.
async fn walk_to_ready(harness: &mut WizardHarness) {
    harness.drive_until("Unlocked ✅").await;
    harness.dispatch(Action::AcknowledgeVideo);
    harness.dispatch(Action::Advance);
    harness.dispatch(Action::ToggleMulti {
        field: "winUnderstanding".into(),
        value: "weekly".into(),
    });
    // First advance fills in the rest of the win rules and stays put.
    harness.dispatch(Action::Advance);
    harness.dispatch(Action::Advance);
    harness.dispatch(Action::ToggleMultiLimited {
        field: "playstyle".into(),
        value: "strategist".into(),
    });
    harness.dispatch(select("motivation", "skills"));
    harness.dispatch(Action::Advance);
    harness.dispatch(Action::ToggleExclusive {
        field: "blockers".into(),
        value: "none".into(),
    });
    harness.dispatch(select("helpConfidence", "yes"));
    harness.dispatch(Action::Advance);
    harness.drive_async().await;
}

struct OfflineSink;

#[async_trait]
impl CompletionSink for OfflineSink {
    async fn record_completion(&self, _record: &CompletionRecord) -> Result<(), StorageError> {
        Err(StorageError::Connection("export target offline".into()))
    }
}

#[tokio::test(flavor = "current_thread")]
async fn fresh_wizard_renders_first_step() {
    let repo = InMemoryRepository::new();
    let mut harness =
        setup_wizard_harness(in_memory_service(&repo, WizardConfig::default()), GateTicker::new());
    harness.rebuild();
    let html = harness.drive_until("Gear Up: 1 / 6").await;

    assert!(html.contains("Status: Not Ready"), "missing status in {html}");
    assert!(html.contains("Kinda"), "missing intent option in {html}");
    assert!(html.contains("Every Week"), "missing frequency option in {html}");
    assert!(html.contains("width: 17%"), "missing progress in {html}");
    assert!(html.contains("Next"), "missing next button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn selections_advance_and_persist() {
    let repo = InMemoryRepository::new();
    let mut harness =
        setup_wizard_harness(in_memory_service(&repo, WizardConfig::default()), GateTicker::new());
    harness.rebuild();
    harness.drive_until("Gear Up: 1 / 6").await;

    harness.dispatch(select("intent", "probably"));
    harness.dispatch(select("frequency", "most_weeks"));
    harness.dispatch(Action::Advance);
    let html = harness.drive_until("Gear Up: 2 / 6").await;
    assert!(html.contains("Unlocks in 12s"), "missing gate label in {html}");

    let session = stored_session(&repo).await.expect("snapshot saved");
    assert_eq!(session.step_index(), 1);
    assert_eq!(session.answers().intent(), Some("probably"));
    assert_eq!(session.answers().frequency(), Some("most_weeks"));
}

#[tokio::test(flavor = "current_thread")]
async fn saved_snapshot_resumes_on_its_step() {
    let repo = InMemoryRepository::new();
    let mut nav = NavigationController::new(WizardConfig::default(), fixed_clock());
    nav.apply(select("intent", "lets_go"));
    nav.apply(select("frequency", "when_i_can"));
    nav.apply(Action::Advance);
    let body = snapshot::encode(nav.session()).expect("encode");
    repo.save_snapshot(&body).await.expect("seed snapshot");

    let mut harness =
        setup_wizard_harness(in_memory_service(&repo, WizardConfig::default()), GateTicker::new());
    harness.rebuild();
    let html = harness.drive_until("Gear Up: 2 / 6").await;
    assert!(html.contains("Unlocks in 12s"), "countdown did not restart in {html}");
    assert!(html.contains("I watched it"), "missing acknowledge chip in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn countdown_unlocks_video_step() {
    let repo = InMemoryRepository::new();
    let config = WizardConfig::default().with_video_seconds(3);
    let mut harness = setup_wizard_harness(in_memory_service(&repo, config), fast_ticker());
    harness.rebuild();
    harness.drive_until("Gear Up: 1 / 6").await;

    harness.dispatch(select("intent", "lets_go"));
    harness.dispatch(select("frequency", "every_week"));
    harness.dispatch(Action::Advance);
    harness.drive_until("Unlocked ✅").await;

    harness.drive_async().await;
    let session = stored_session(&repo).await.expect("snapshot saved");
    assert!(session.answers().video_unlocked());
}

#[tokio::test(flavor = "current_thread")]
async fn finishing_records_completion_and_restart_clears() {
    let repo = InMemoryRepository::new();
    let config = WizardConfig::default().with_video_seconds(2);
    let mut harness = setup_wizard_harness(in_memory_service(&repo, config), fast_ticker());
    harness.rebuild();
    harness.drive_until("Gear Up: 1 / 6").await;

    harness.dispatch(select("intent", "lets_go"));
    harness.dispatch(select("frequency", "every_week"));
    harness.dispatch(Action::Advance);
    walk_to_ready(&mut harness).await;

    let html = harness.drive_until("Gear Up: 6 / 6").await;
    assert!(html.contains("Finish"), "missing finish label in {html}");

    harness.dispatch(Action::ConfirmReady);
    harness.dispatch(Action::Advance);
    let html = harness
        .drive_until("Completion record saved: vesl-gearup-2023-11-14-22-13-20.json")
        .await;
    assert!(html.contains("Status: Season Ready ✅"), "missing ready pill in {html}");
    assert_eq!(repo.completions().expect("completions").len(), 1);

    harness.dispatch(Action::Restart);
    harness.drive_until("Gear Up: 1 / 6").await;
    harness.drive_async().await;
    let session = stored_session(&repo).await.expect("fresh snapshot saved");
    assert_eq!(session.step_index(), 0);
    assert_eq!(session.answers().intent(), None);
}

#[tokio::test(flavor = "current_thread")]
async fn failed_export_shows_retry_message() {
    let repo = InMemoryRepository::new();
    let config = WizardConfig::default().with_video_seconds(2);
    let onboarding = OnboardingService::new(
        fixed_clock(),
        config,
        Arc::new(repo.clone()),
        Arc::new(OfflineSink),
    );
    let mut harness = setup_wizard_harness(onboarding, fast_ticker());
    harness.rebuild();
    harness.drive_until("Gear Up: 1 / 6").await;

    harness.dispatch(select("intent", "lets_go"));
    harness.dispatch(select("frequency", "every_week"));
    harness.dispatch(Action::Advance);
    walk_to_ready(&mut harness).await;

    harness.dispatch(Action::ConfirmReady);
    harness.dispatch(Action::Advance);
    let html = harness.drive_until("save your completion record").await;
    assert!(html.contains("Status: Season Ready ✅"), "session should stay complete: {html}");
}
