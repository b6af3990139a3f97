use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{VideoPolicy, WizardConfig};
use crate::model::{Catalog, FieldKey, Notice, Session};

//
// ─── STEP KEYS ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKey {
    Welcome,
    Video,
    HowToWin,
    Playstyle,
    Support,
    Ready,
}

impl StepKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StepKey::Welcome => "welcome",
            StepKey::Video => "video",
            StepKey::HowToWin => "how_to_win",
            StepKey::Playstyle => "playstyle",
            StepKey::Support => "support",
            StepKey::Ready => "ready",
        }
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── RULES ─────────────────────────────────────────────────────────────────────
//

/// What a step's rules may read besides the session.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub config: &'a WizardConfig,
    pub catalog: &'a Catalog,
}

/// Result of a pre-advance validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Proceed,
    /// Advance refused; the notice explains why and the user must retry.
    Veto(Notice),
}

/// Side effect run when a step becomes current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterHook {
    StartVideoGate,
}

type CanProceed = fn(&Session, &StepContext<'_>) -> bool;
type ValidateBeforeNext = fn(&mut Session, &StepContext<'_>) -> Validation;

/// One screen of the wizard: display copy, the fields it shows, and its rules.
#[derive(Clone)]
pub struct StepDefinition {
    pub key: StepKey,
    pub title: &'static str,
    pub kicker: &'static str,
    pub headline: &'static str,
    pub body: &'static str,
    pub tip: Option<&'static str>,
    pub fields: &'static [FieldKey],
    can_proceed: CanProceed,
    validate_before_next: Option<ValidateBeforeNext>,
    on_enter: Option<EnterHook>,
}

impl StepDefinition {
    /// Whether the forward button should be enabled right now.
    #[must_use]
    pub fn can_proceed(&self, session: &Session, ctx: &StepContext<'_>) -> bool {
        (self.can_proceed)(session, ctx)
    }

    /// Runs the pre-advance validator, which may fill in answers.
    pub fn validate_before_next(&self, session: &mut Session, ctx: &StepContext<'_>) -> Validation {
        match self.validate_before_next {
            Some(validate) => validate(session, ctx),
            None => Validation::Proceed,
        }
    }

    #[must_use]
    pub fn on_enter(&self) -> Option<EnterHook> {
        self.on_enter
    }

    #[must_use]
    pub fn shows(&self, field: FieldKey) -> bool {
        self.fields.contains(&field)
    }
}

impl fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("key", &self.key)
            .field("fields", &self.fields)
            .field("on_enter", &self.on_enter)
            .finish_non_exhaustive()
    }
}

fn welcome_complete(session: &Session, _ctx: &StepContext<'_>) -> bool {
    let answers = session.answers();
    answers.intent().is_some() && answers.frequency().is_some()
}

fn video_complete(session: &Session, ctx: &StepContext<'_>) -> bool {
    let answers = session.answers();
    match ctx.config.video_policy {
        VideoPolicy::TimerOnly => answers.video_unlocked(),
        VideoPolicy::TimerAndAcknowledge => {
            answers.video_unlocked() && answers.watched_short_video()
        }
    }
}

fn always(_session: &Session, _ctx: &StepContext<'_>) -> bool {
    true
}

/// Every canonical winning rule must be selected; missing ones are filled in
/// and the first attempt is vetoed so the user sees why.
fn enforce_win_rules(session: &mut Session, ctx: &StepContext<'_>) -> Validation {
    let selection = &mut session.answers.win_understanding;
    let mut added = Vec::new();
    for value in ctx.catalog.canonical_win_set() {
        if selection.insert(value) {
            added.push(value.to_owned());
        }
    }
    if added.is_empty() {
        Validation::Proceed
    } else {
        Validation::Veto(Notice::WinRulesAutoSelected { added })
    }
}

fn playstyle_complete(session: &Session, _ctx: &StepContext<'_>) -> bool {
    let answers = session.answers();
    !answers.playstyle().is_empty() && answers.motivation().is_some()
}

fn support_complete(session: &Session, _ctx: &StepContext<'_>) -> bool {
    let answers = session.answers();
    !answers.blockers().is_empty() && answers.help_confidence().is_some()
}

fn ready_confirmed(session: &Session, _ctx: &StepContext<'_>) -> bool {
    session.answers().ready()
}

//
// ─── TABLE ─────────────────────────────────────────────────────────────────────
//

/// Ordered, fixed-length list of steps. The last one is terminal.
#[derive(Debug, Clone)]
pub struct StepTable {
    steps: Vec<StepDefinition>,
}

impl StepTable {
    /// The six-checkpoint season gear-up.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            steps: vec![
                StepDefinition {
                    key: StepKey::Welcome,
                    title: "Gear Up",
                    kicker: "Checkpoint 1",
                    headline: "You're on a STEM team this season.",
                    body: "Before challenges begin, let's get you geared up: how the season \
                           works, how to win, and what to do on Day 1.",
                    tip: None,
                    fields: &[FieldKey::Intent, FieldKey::Frequency],
                    can_proceed: welcome_complete,
                    validate_before_next: None,
                    on_enter: None,
                },
                StepDefinition {
                    key: StepKey::Video,
                    title: "How It Works",
                    kicker: "Checkpoint 2",
                    headline: "Watch this quick vid!",
                    body: "This explains how weekly challenges work, how points & rewards \
                           work, and how teams qualify.",
                    tip: Some("Showing up on time matters: featured weeks hit harder."),
                    fields: &[],
                    can_proceed: video_complete,
                    validate_before_next: None,
                    on_enter: Some(EnterHook::StartVideoGate),
                },
                StepDefinition {
                    key: StepKey::HowToWin,
                    title: "How You Win",
                    kicker: "Checkpoint 3",
                    headline: "Winning is simple.",
                    body: "You win by showing up on time, submitting consistently, and earning \
                           points for your team. Featured weeks matter.",
                    tip: Some("Consistency beats perfection. Submit something every week."),
                    fields: &[FieldKey::WinUnderstanding],
                    can_proceed: always,
                    validate_before_next: Some(enforce_win_rules),
                    on_enter: None,
                },
                StepDefinition {
                    key: StepKey::Playstyle,
                    title: "Your Playstyle",
                    kicker: "Checkpoint 4",
                    headline: "Choose your playstyle (pick up to 2).",
                    body: "You don't need to be \"the best\" at everything. Choose what feels \
                           like you.",
                    tip: Some("Team points = States. Your weekly work helps everyone."),
                    fields: &[FieldKey::Playstyle, FieldKey::Motivation],
                    can_proceed: playstyle_complete,
                    validate_before_next: None,
                    on_enter: None,
                },
                StepDefinition {
                    key: StepKey::Support,
                    title: "Support",
                    kicker: "Checkpoint 5",
                    headline: "If you get stuck, you still win.",
                    body: "The goal is progress—not perfection. Use the help tools, ask \
                           questions, and keep moving.",
                    tip: Some(
                        "Most students who qualify for States are the ones who submit \
                         consistently.",
                    ),
                    fields: &[FieldKey::Blockers, FieldKey::HelpConfidence],
                    can_proceed: support_complete,
                    validate_before_next: None,
                    on_enter: None,
                },
                StepDefinition {
                    key: StepKey::Ready,
                    title: "Ready",
                    kicker: "Final Checkpoint",
                    headline: "Ready to enter the season?",
                    body: "By clicking ready, you're officially geared up. You'll know what to \
                           do when challenges drop—and how to help your team win.",
                    tip: Some("You can come back anytime, but being ready now helps you win early."),
                    fields: &[],
                    can_proceed: ready_confirmed,
                    validate_before_next: None,
                    on_enter: None,
                },
            ],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    #[must_use]
    pub fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&StepDefinition> {
        self.steps.get(index)
    }

    /// Step at `index`, clamped to the terminal step.
    #[must_use]
    pub fn at(&self, index: usize) -> &StepDefinition {
        &self.steps[index.min(self.last_index())]
    }

    #[must_use]
    pub fn is_terminal(&self, index: usize) -> bool {
        index == self.last_index()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepDefinition> {
        self.steps.iter()
    }
}

impl Default for StepTable {
    fn default() -> Self {
        Self::standard()
    }
}
