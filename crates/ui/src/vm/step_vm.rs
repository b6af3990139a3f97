use gearup_core::model::{ActionKind, FieldKey, FieldKind, Notice};
use gearup_core::{GateState, NavigationController, StepKey, VideoPolicy};

/// One selectable tile or chip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionTileVm {
    pub key: String,
    pub label: String,
    pub sub: Option<String>,
    pub selected: bool,
}

/// A field shown on the current step, with its options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldVm {
    pub key: FieldKey,
    pub prompt: String,
    pub hint: Option<String>,
    pub action: ActionKind,
    pub tiles: Vec<OptionTileVm>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoVm {
    pub embed_url: Option<String>,
    pub gate_label: String,
    pub unlocked: bool,
    pub watched: bool,
    pub needs_acknowledge: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoticeVm {
    pub message: String,
    pub blocking: bool,
}

impl From<&Notice> for NoticeVm {
    fn from(notice: &Notice) -> Self {
        Self {
            message: notice.message(),
            blocking: notice.is_blocking(),
        }
    }
}

/// Everything the wizard view renders for the current step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepVm {
    pub key: StepKey,
    pub step_label: String,
    pub progress_percent: u8,
    pub kicker: String,
    pub headline: String,
    pub body: String,
    pub callout: Option<&'static str>,
    pub tip: Option<String>,
    pub back_enabled: bool,
    pub next_label: &'static str,
    pub next_enabled: bool,
    pub fields: Vec<FieldVm>,
    pub video: Option<VideoVm>,
    pub ready_confirmed: bool,
    pub season_ready: bool,
    pub status_pill: &'static str,
}

impl StepVm {
    #[must_use]
    pub fn from_controller(nav: &NavigationController) -> Self {
        let step = nav.current_step();
        let index = nav.session().step_index();
        let total = nav.steps().len();
        let answers = nav.session().answers();
        let season_ready = nav.session().is_season_ready();

        let fields = step
            .fields
            .iter()
            .filter_map(|key| nav.catalog().field(*key))
            .map(|spec| FieldVm {
                key: spec.key,
                prompt: spec.prompt.clone(),
                hint: match &spec.kind {
                    FieldKind::MultiLimited { limit } => Some(format!("Pick up to {limit}.")),
                    FieldKind::Single | FieldKind::Multi | FieldKind::MultiExclusive { .. } => {
                        None
                    }
                },
                action: spec.kind.action_kind(),
                tiles: spec
                    .options
                    .iter()
                    .map(|option| OptionTileVm {
                        key: option.key.clone(),
                        label: option.label.clone(),
                        sub: option.sub.clone(),
                        selected: answers.is_selected(spec.key, &option.key),
                    })
                    .collect(),
            })
            .collect();

        let video = (step.key == StepKey::Video).then(|| {
            let config = nav.config();
            VideoVm {
                embed_url: config.video_embed_url.as_ref().map(ToString::to_string),
                gate_label: gate_label(nav.gate().state(), config.gate_seconds()),
                unlocked: answers.video_unlocked(),
                watched: answers.watched_short_video(),
                needs_acknowledge: config.video_policy == VideoPolicy::TimerAndAcknowledge,
            }
        });

        Self {
            key: step.key,
            step_label: format!("Gear Up: {} / {}", index + 1, total),
            progress_percent: progress_percent(index, total),
            kicker: step.kicker.to_owned(),
            headline: step.headline.to_owned(),
            body: step.body.to_owned(),
            callout: callout(step.key),
            tip: step
                .tip
                .map(str::to_owned)
                .or_else(|| nav.config().fallback_tip().map(str::to_owned)),
            back_enabled: index > 0,
            next_label: if nav.is_terminal() { "Finish" } else { "Next" },
            next_enabled: nav.can_proceed(),
            fields,
            video,
            ready_confirmed: answers.ready(),
            season_ready,
            status_pill: if season_ready {
                "Status: Season Ready ✅"
            } else {
                "Status: Not Ready"
            },
        }
    }
}

fn progress_percent(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = ((index + 1) * 100 + total / 2) / total;
    u8::try_from(pct.min(100)).unwrap_or(100)
}

fn gate_label(state: GateState, seconds: u32) -> String {
    match state {
        GateState::Running { remaining } => format!("Unlocks in {remaining}s"),
        GateState::Unlocked => "Unlocked ✅".to_owned(),
        GateState::Idle => format!("Unlocks in {seconds}s"),
    }
}

fn callout(step: StepKey) -> Option<&'static str> {
    match step {
        StepKey::Video => Some("When the timer hits 0, you can continue."),
        StepKey::Support => Some(
            "Help tip: Your teacher/coach + the platform help links are part of the game.",
        ),
        StepKey::Ready => Some("Unlock: Season Ready badge + faster Day 1 start."),
        StepKey::Welcome | StepKey::HowToWin | StepKey::Playstyle => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gearup_core::time::fixed_clock;
    use gearup_core::{Action, WizardConfig};

    fn select(field: &str, value: &str) -> Action {
        Action::Select {
            field: field.into(),
            value: value.into(),
        }
    }

    #[test]
    fn first_step_labels_and_buttons() {
        let nav = NavigationController::new(WizardConfig::default(), fixed_clock());
        let vm = StepVm::from_controller(&nav);

        assert_eq!(vm.step_label, "Gear Up: 1 / 6");
        assert_eq!(vm.progress_percent, 17);
        assert!(!vm.back_enabled);
        assert!(!vm.next_enabled);
        assert_eq!(vm.next_label, "Next");
        assert_eq!(vm.status_pill, "Status: Not Ready");
        assert_eq!(
            vm.tip.as_deref(),
            Some("This takes ~5 minutes. No grades—just gear-up.")
        );
        assert_eq!(vm.fields.len(), 2);
        assert!(vm.fields.iter().all(|field| field.action == ActionKind::Select));
        assert!(vm.video.is_none());
    }

    #[test]
    fn tiles_reflect_selection() {
        let mut nav = NavigationController::new(WizardConfig::default(), fixed_clock());
        nav.apply(select("intent", "probably"));
        let vm = StepVm::from_controller(&nav);

        let intent = &vm.fields[0];
        assert_eq!(intent.key, FieldKey::Intent);
        let selected: Vec<&str> = intent
            .tiles
            .iter()
            .filter(|tile| tile.selected)
            .map(|tile| tile.key.as_str())
            .collect();
        assert_eq!(selected, ["probably"]);
    }

    #[test]
    fn video_step_shows_countdown() {
        let mut nav = NavigationController::new(WizardConfig::default(), fixed_clock());
        nav.apply(select("intent", "lets_go"));
        nav.apply(select("frequency", "every_week"));
        nav.apply(Action::Advance);
        nav.apply(Action::Tick);

        let vm = StepVm::from_controller(&nav);
        let video = vm.video.expect("video step");
        assert_eq!(video.gate_label, "Unlocks in 11s");
        assert!(video.needs_acknowledge);
        assert!(!video.unlocked);
        assert!(vm.back_enabled);
        assert_eq!(vm.progress_percent, 33);
    }

    #[test]
    fn last_step_progress_is_full() {
        assert_eq!(progress_percent(5, 6), 100);
        assert_eq!(progress_percent(2, 6), 50);
    }
}
