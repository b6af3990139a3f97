use std::sync::Arc;
use std::time::Duration;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use gearup_core::time::fixed_clock;
use gearup_core::{Action, WizardConfig};
use services::{GateTicker, OnboardingService};
use storage::repository::InMemoryRepository;

use crate::context::{UiApp, build_app_context};
use crate::views::WizardView;
use crate::views::wizard::WizardTestHandles;

#[derive(Clone)]
struct TestApp {
    onboarding: Arc<OnboardingService>,
    ticker: GateTicker,
}

impl UiApp for TestApp {
    fn onboarding(&self) -> Arc<OnboardingService> {
        Arc::clone(&self.onboarding)
    }

    fn ticker(&self) -> GateTicker {
        self.ticker
    }
}

#[derive(Props, Clone)]
struct WizardHarnessProps {
    app: Arc<TestApp>,
    handles: WizardTestHandles,
}

impl PartialEq for WizardHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for WizardHarnessProps {}

#[component]
fn WizardHarnessRoot(props: WizardHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    let handles = props.handles.clone();
    use_context_provider(|| handles);
    rsx! { WizardView {} }
}

pub struct WizardHarness {
    pub dom: VirtualDom,
    pub handles: WizardTestHandles,
}

impl WizardHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(Duration::from_millis(50), self.dom.wait_for_work()).await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Drives the dom until the rendered html contains `needle`.
    pub async fn drive_until(&mut self, needle: &str) -> String {
        for _ in 0..100 {
            self.drive_async().await;
            let html = self.render();
            if html.contains(needle) {
                return html;
            }
        }
        let html = self.render();
        panic!("never rendered {needle:?}; last html: {html}");
    }

    pub fn dispatch(&mut self, action: Action) {
        let handles = self.handles.clone();
        self.dom.in_runtime(|| handles.dispatch(action));
        drive_dom(&mut self.dom);
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

/// An onboarding service over `repo`, stamped with the fixed test clock.
pub fn in_memory_service(repo: &InMemoryRepository, config: WizardConfig) -> OnboardingService {
    OnboardingService::new(
        fixed_clock(),
        config,
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    )
}

/// A ticker fast enough that a whole countdown fits inside a few dom drives.
pub fn fast_ticker() -> GateTicker {
    GateTicker::new().with_period(Duration::from_millis(1))
}

pub fn setup_wizard_harness(onboarding: OnboardingService, ticker: GateTicker) -> WizardHarness {
    let handles = WizardTestHandles::default();
    let app = Arc::new(TestApp {
        onboarding: Arc::new(onboarding),
        ticker,
    });
    let dom = VirtualDom::new_with_props(
        WizardHarnessRoot,
        WizardHarnessProps {
            app,
            handles: handles.clone(),
        },
    );
    WizardHarness { dom, handles }
}
