use dioxus::prelude::*;
use tokio::sync::mpsc;

use gearup_core::model::Session;
use gearup_core::{Action, NavigationController, Outcome, StepKey, Transition};

use crate::context::AppContext;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{FieldVm, NoticeVm, StepVm, VideoVm};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

type PersistJob = (Transition, Session);

#[component]
pub fn WizardView() -> Element {
    let ctx = use_context::<AppContext>();
    let onboarding = ctx.onboarding();
    let ticker = ctx.ticker();

    let mut nav = use_signal(|| None::<NavigationController>);
    let mut notices = use_signal(Vec::<NoticeVm>::new);
    let mut error = use_signal(|| None::<ViewError>);
    let mut exported = use_signal(|| None::<String>);
    let mut confirm_restart = use_signal(|| false);
    let mut gate_epoch = use_signal(|| 0_u64);

    // Saves run one at a time, in the order the transitions happened.
    let persist_tx = {
        let onboarding = onboarding.clone();
        use_hook(move || {
            let (tx, mut rx) = mpsc::unbounded_channel::<PersistJob>();
            spawn(async move {
                while let Some((transition, session)) = rx.recv().await {
                    match onboarding.persist(&transition, &session).await {
                        Ok(()) => {
                            if let Some(record) = transition.completion() {
                                exported.set(Some(record.file_name()));
                                error.set(None);
                            }
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "failed to record completion");
                            error.set(Some(ViewError::ExportFailed));
                        }
                    }
                }
            });
            tx
        })
    };

    let dispatch = {
        let onboarding = onboarding.clone();
        use_callback(move |action: Action| {
            let is_tick = matches!(action, Action::Tick);
            let (transition, session, gate_started) = {
                let mut guard = nav.write();
                let Some(controller) = guard.as_mut() else {
                    return;
                };
                let was_running = controller.gate().is_running();
                let transition = onboarding.apply(controller, action);
                let gate_started = !was_running && controller.gate().is_running();
                (transition, controller.session().clone(), gate_started)
            };

            if gate_started {
                *gate_epoch.write() += 1;
            }
            if !is_tick {
                notices.set(transition.notices.iter().map(NoticeVm::from).collect());
            }
            if matches!(transition.outcome, Outcome::Restarted) {
                exported.set(None);
                error.set(None);
            }
            if persist_tx.send((transition, session)).is_err() {
                tracing::warn!("persistence worker stopped; change not saved");
            }
        })
    };

    let resource = {
        let onboarding = onboarding.clone();
        use_resource(move || {
            let onboarding = onboarding.clone();
            async move {
                let resumed = onboarding.resume().await;
                let running = resumed.gate().is_running();
                nav.set(Some(resumed));
                if running {
                    *gate_epoch.write() += 1;
                }
                Ok::<_, ViewError>(())
            }
        })
    };

    // Restarted whenever a countdown starts; dropping the previous run drops
    // its tick stream, so a stale timer never reaches a later step.
    let _gate_driver = use_resource(move || {
        let _epoch = gate_epoch();
        async move {
            let mut ticks = ticker.ticks();
            while nav
                .peek()
                .as_ref()
                .is_some_and(|controller| controller.gate().is_running())
            {
                ticks.next().await;
                dispatch.call(Action::Tick);
            }
        }
    });

    #[cfg(test)]
    use_hook(|| {
        if let Some(handles) = try_consume_context::<WizardTestHandles>() {
            handles.register(dispatch);
        }
    });

    let state = view_state_from_resource(resource);
    let step = nav.read().as_ref().map(StepVm::from_controller);

    rsx! {
        div { class: "page wizard",
            match (state, step) {
                (ViewState::Ready(()), Some(vm)) => rsx! {
                    WizardHeader {
                        step_label: vm.step_label.clone(),
                        status_pill: vm.status_pill,
                        season_ready: vm.season_ready,
                        progress_percent: vm.progress_percent,
                    }
                    section { class: "card",
                        div { class: "kicker", "{vm.kicker}" }
                        h1 { class: "h1", "{vm.headline}" }
                        p { class: "p", "{vm.body}" }
                        if let Some(video) = vm.video.clone() {
                            VideoPanel { video, on_action: dispatch }
                        }
                        for field in vm.fields.clone() {
                            FieldGroup { key: "{field.key}", field: field.clone(), on_action: dispatch }
                        }
                        if vm.key == StepKey::Ready {
                            ReadyTile { confirmed: vm.ready_confirmed, on_action: dispatch }
                        }
                        if let Some(callout) = vm.callout {
                            div { class: "notice", "{callout}" }
                        }
                    }
                    for notice in notices() {
                        div {
                            class: if notice.blocking { "notice notice--blocking" } else { "notice" },
                            role: "status",
                            "{notice.message}"
                        }
                    }
                    if let Some(file_name) = exported() {
                        div { class: "notice notice--success", "Completion record saved: {file_name}" }
                    }
                    if let Some(err) = error() {
                        p { class: "error", "{err.message()}" }
                    }
                    footer { class: "footer",
                        if let Some(tip) = vm.tip.clone() {
                            p { class: "tip", "{tip}" }
                        }
                        div { class: "footer-actions",
                            button {
                                class: "btn",
                                r#type: "button",
                                disabled: !vm.back_enabled,
                                onclick: move |_| dispatch.call(Action::Retreat),
                                "Back"
                            }
                            if confirm_restart() {
                                span { class: "confirm",
                                    "Restart gear-up? This will clear your answers on this device."
                                    button {
                                        class: "btn btn--danger",
                                        r#type: "button",
                                        onclick: move |_| {
                                            confirm_restart.set(false);
                                            dispatch.call(Action::Restart);
                                        },
                                        "Restart"
                                    }
                                    button {
                                        class: "btn",
                                        r#type: "button",
                                        onclick: move |_| confirm_restart.set(false),
                                        "Cancel"
                                    }
                                }
                            } else {
                                button {
                                    class: "btn",
                                    r#type: "button",
                                    onclick: move |_| confirm_restart.set(true),
                                    "Restart"
                                }
                            }
                            button {
                                class: "btn btn--primary",
                                r#type: "button",
                                disabled: !vm.next_enabled,
                                onclick: move |_| dispatch.call(Action::Advance),
                                "{vm.next_label}"
                            }
                        }
                    }
                },
                (ViewState::Error(err), _) => rsx! {
                    p { "{err.message()}" }
                    button {
                        class: "btn",
                        r#type: "button",
                        onclick: move |_| {
                            let mut resource = resource;
                            resource.restart();
                        },
                        "Retry"
                    }
                },
                _ => rsx! {
                    p { "Loading..." }
                },
            }
        }
    }
}

#[component]
fn WizardHeader(
    step_label: String,
    status_pill: &'static str,
    season_ready: bool,
    progress_percent: u8,
) -> Element {
    rsx! {
        header { class: "topbar",
            div { class: "brand", "VESL Gear-Up" }
            span { class: "step-label", "{step_label}" }
            span {
                class: if season_ready { "pill pill--ready" } else { "pill" },
                "{status_pill}"
            }
        }
        div { class: "progress",
            div { class: "progress-fill", style: "width: {progress_percent}%" }
        }
    }
}

#[component]
fn FieldGroup(field: FieldVm, on_action: Callback<Action>) -> Element {
    let kind = field.action;
    let field_key = field.key.as_str();

    rsx! {
        div { class: "field",
            h3 { class: "field-prompt", "{field.prompt}" }
            if let Some(hint) = field.hint.clone() {
                div { class: "tiny", "{hint}" }
            }
            div { class: "grid", role: "group", aria_label: "{field.prompt}",
                for tile in field.tiles.clone() {
                    button {
                        key: "{tile.key}",
                        class: if tile.selected { "tile selected" } else { "tile" },
                        r#type: "button",
                        "data-value": "{tile.key}",
                        aria_pressed: "{tile.selected}",
                        onclick: {
                            let value = tile.key.clone();
                            move |_| on_action.call(Action::field(kind, field_key, value.clone()))
                        },
                        div { class: "tileTitle", "{tile.label}" }
                        if let Some(sub) = tile.sub.clone() {
                            div { class: "tileSub", "{sub}" }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn VideoPanel(video: VideoVm, on_action: Callback<Action>) -> Element {
    rsx! {
        div { class: "videoWrap",
            div { class: "videoHeader",
                div { class: "tiny", "Short video" }
                div { class: "tiny", id: "videoTimer", "{video.gate_label}" }
            }
            if let Some(url) = video.embed_url.clone() {
                iframe {
                    class: "videoFrame",
                    src: "{url}",
                    title: "Season briefing video",
                    allow: "autoplay; fullscreen; picture-in-picture",
                }
            } else {
                div { class: "videoMissing", "No briefing video is configured for this season." }
            }
        }
        if video.needs_acknowledge {
            div { class: "row", role: "group", aria_label: "Video confirmation",
                button {
                    class: if video.watched { "chip selected" } else { "chip" },
                    r#type: "button",
                    onclick: move |_| on_action.call(Action::AcknowledgeVideo),
                    "✅ I watched it"
                }
            }
        }
    }
}

#[component]
fn ReadyTile(confirmed: bool, on_action: Callback<Action>) -> Element {
    rsx! {
        div { class: "grid",
            button {
                class: if confirmed { "tile tile--wide selected" } else { "tile tile--wide" },
                r#type: "button",
                id: "readyTile",
                onclick: move |_| on_action.call(Action::ConfirmReady),
                div { class: "tileTitle", "✅ I'm Season Ready" }
                div { class: "tileSub", "I know what to do when challenges drop." }
            }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct WizardTestHandles {
    dispatch: Rc<RefCell<Option<Callback<Action>>>>,
}

#[cfg(test)]
impl WizardTestHandles {
    fn register(&self, dispatch: Callback<Action>) {
        *self.dispatch.borrow_mut() = Some(dispatch);
    }

    pub(crate) fn dispatch(&self, action: Action) {
        let callback = *self.dispatch.borrow();
        if let Some(callback) = callback {
            callback.call(action);
        }
    }
}
