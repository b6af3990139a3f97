use crate::config::WizardConfig;
use crate::error::ActionError;
use crate::gate::{GateEvent, TimedGate};
use crate::model::{ActionKind, Catalog, CompletionRecord, FieldKey, Notice, Session};
use crate::mutators::{self, Mutation};
use crate::steps::{EnterHook, StepContext, StepDefinition, StepKey, StepTable, Validation};
use crate::time::Clock;

//
// ─── ACTIONS & TRANSITIONS ─────────────────────────────────────────────────────
//

/// Discrete event reported by the presentation layer (or the gate driver).
///
/// Field actions carry the raw keys from the view; they are checked against
/// the option catalog before anything is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Select { field: String, value: String },
    ToggleMulti { field: String, value: String },
    ToggleMultiLimited { field: String, value: String },
    ToggleExclusive { field: String, value: String },
    /// "I watched it" on the video step.
    AcknowledgeVideo,
    /// "I'm Season Ready" on the terminal step.
    ConfirmReady,
    Advance,
    Retreat,
    Restart,
    /// One second of the video gate countdown.
    Tick,
}

impl Action {
    /// Builds the field action matching `kind`.
    #[must_use]
    pub fn field(kind: ActionKind, field: impl Into<String>, value: impl Into<String>) -> Self {
        let (field, value) = (field.into(), value.into());
        match kind {
            ActionKind::Select => Action::Select { field, value },
            ActionKind::ToggleMulti => Action::ToggleMulti { field, value },
            ActionKind::ToggleMultiLimited => Action::ToggleMultiLimited { field, value },
            ActionKind::ToggleExclusive => Action::ToggleExclusive { field, value },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// An answer changed.
    Updated,
    /// Nothing changed (repeat pick, refused add, retreat at the first step).
    Unchanged,
    Advanced { from: usize, to: usize },
    Retreated { from: usize, to: usize },
    /// `canProceed` was false.
    Blocked,
    /// The step's validator refused the advance, possibly after filling in
    /// answers.
    Vetoed,
    Completed(Box<CompletionRecord>),
    Restarted,
    Ticked { remaining: u32 },
    GateUnlocked,
    Rejected(ActionError),
}

/// Result of one action: what happened plus any advisories to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub outcome: Outcome,
    pub notices: Vec<Notice>,
}

impl Transition {
    fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            notices: Vec::new(),
        }
    }

    fn with_notice(mut self, notice: Notice) -> Self {
        self.notices.push(notice);
        self
    }

    fn rejected(err: ActionError) -> Self {
        Self::new(Outcome::Rejected(err))
    }

    /// Whether the session changed and should be saved.
    #[must_use]
    pub fn mutated(&self) -> bool {
        matches!(
            self.outcome,
            Outcome::Updated
                | Outcome::Advanced { .. }
                | Outcome::Retreated { .. }
                | Outcome::Vetoed
                | Outcome::Completed(_)
                | Outcome::Restarted
                | Outcome::GateUnlocked
        )
    }

    #[must_use]
    pub fn completion(&self) -> Option<&CompletionRecord> {
        match &self.outcome {
            Outcome::Completed(record) => Some(&**record),
            _ => None,
        }
    }
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Owns the session and the video gate, and moves between steps.
#[derive(Debug, Clone)]
pub struct NavigationController {
    session: Session,
    gate: TimedGate,
    steps: StepTable,
    catalog: Catalog,
    config: WizardConfig,
    clock: Clock,
}

impl NavigationController {
    /// Starts a fresh session on the first step.
    #[must_use]
    pub fn new(config: WizardConfig, clock: Clock) -> Self {
        let session = Session::new(clock.now());
        Self::resume_at(session, config, clock, Catalog::standard())
    }

    /// Resumes a restored session.
    ///
    /// A completed session is parked on the terminal step so a finished flow
    /// is never replayed from the middle. The current step's entry hook runs.
    #[must_use]
    pub fn resume_at(
        mut session: Session,
        config: WizardConfig,
        clock: Clock,
        catalog: Catalog,
    ) -> Self {
        let steps = StepTable::standard();
        session.step_index = if session.is_complete() {
            steps.last_index()
        } else {
            session.step_index.min(steps.last_index())
        };

        let mut controller = Self {
            session,
            gate: TimedGate::new(),
            steps,
            catalog,
            config,
            clock,
        };
        controller.enter_current();
        controller
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn gate(&self) -> &TimedGate {
        &self.gate
    }

    #[must_use]
    pub fn steps(&self) -> &StepTable {
        &self.steps
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    #[must_use]
    pub fn current_step(&self) -> &StepDefinition {
        self.steps.at(self.session.step_index)
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.steps.is_terminal(self.session.step_index)
    }

    /// Whether advancing is currently legal. Re-evaluate after every
    /// transition, including gate ticks.
    #[must_use]
    pub fn can_proceed(&self) -> bool {
        let ctx = StepContext {
            config: &self.config,
            catalog: &self.catalog,
        };
        self.current_step().can_proceed(&self.session, &ctx)
    }

    #[must_use]
    pub fn completion_record(&self) -> Option<CompletionRecord> {
        CompletionRecord::from_session(&self.session, &self.config)
    }

    /// Translates one presentation event into mutator or navigation calls.
    pub fn apply(&mut self, action: Action) -> Transition {
        match action {
            Action::Select { field, value } => self.pick(ActionKind::Select, &field, &value),
            Action::ToggleMulti { field, value } => {
                self.pick(ActionKind::ToggleMulti, &field, &value)
            }
            Action::ToggleMultiLimited { field, value } => {
                self.pick(ActionKind::ToggleMultiLimited, &field, &value)
            }
            Action::ToggleExclusive { field, value } => {
                self.pick(ActionKind::ToggleExclusive, &field, &value)
            }
            Action::AcknowledgeVideo => self.acknowledge_video(),
            Action::ConfirmReady => self.confirm_ready(),
            Action::Advance => self.advance(),
            Action::Retreat => self.retreat(),
            Action::Restart => self.restart(),
            Action::Tick => self.tick(),
        }
    }

    /// Applies a field pick after checking it against the catalog and the
    /// current step.
    pub fn pick(&mut self, requested: ActionKind, field: &str, value: &str) -> Transition {
        let field = match field.parse::<FieldKey>() {
            Ok(field) => field,
            Err(err) => return Transition::rejected(err),
        };
        let step = self.steps.at(self.session.step_index);
        if !step.shows(field) {
            return Transition::rejected(ActionError::FieldNotOnStep {
                field,
                step: step.key,
            });
        }
        let Some(spec) = self.catalog.field(field) else {
            return Transition::rejected(ActionError::UnknownField(field.to_string()));
        };
        if spec.kind.action_kind() != requested {
            return Transition::rejected(ActionError::KindMismatch { field, requested });
        }
        let Some(option) = spec.option(value) else {
            return Transition::rejected(ActionError::UnknownOption {
                field,
                value: value.to_owned(),
            });
        };
        let offers_support = option.offers_support;

        let transition = match mutators::apply(&mut self.session.answers, field, &spec.kind, value)
        {
            Mutation::Changed => Transition::new(Outcome::Updated),
            Mutation::Unchanged => Transition::new(Outcome::Unchanged),
            Mutation::LimitReached { limit } => {
                return Transition::new(Outcome::Unchanged)
                    .with_notice(Notice::LimitReached { field, limit });
            }
        };
        // Re-picking a support option still points the user at help.
        if offers_support && self.session.answers.is_selected(field, value) {
            transition.with_notice(Notice::SupportContacts {
                contacts: self.config.support_contacts.clone(),
            })
        } else {
            transition
        }
    }

    /// Records the explicit "I watched it" acknowledgement. One-way.
    pub fn acknowledge_video(&mut self) -> Transition {
        if let Some(rejection) = self.require_step(StepKey::Video, "acknowledge video") {
            return rejection;
        }
        if self.session.answers.watched_short_video {
            return Transition::new(Outcome::Unchanged);
        }
        self.session.answers.watched_short_video = true;
        Transition::new(Outcome::Updated)
    }

    /// Sets the terminal `ready` flag.
    pub fn confirm_ready(&mut self) -> Transition {
        if let Some(rejection) = self.require_step(StepKey::Ready, "confirm ready") {
            return rejection;
        }
        if self.session.answers.ready {
            return Transition::new(Outcome::Unchanged);
        }
        self.session.answers.ready = true;
        Transition::new(Outcome::Updated)
    }

    /// Moves forward if the current step allows it; on the terminal step this
    /// confirms completion instead.
    pub fn advance(&mut self) -> Transition {
        let index = self.session.step_index;
        let ctx = StepContext {
            config: &self.config,
            catalog: &self.catalog,
        };
        let step = self.steps.at(index);

        if let Validation::Veto(notice) = step.validate_before_next(&mut self.session, &ctx) {
            return Transition::new(Outcome::Vetoed).with_notice(notice);
        }
        if !step.can_proceed(&self.session, &ctx) {
            return Transition::new(Outcome::Blocked);
        }
        if self.steps.is_terminal(index) {
            return self.complete();
        }

        self.gate.stop();
        self.session.step_index = index + 1;
        self.enter_current();
        Transition::new(Outcome::Advanced {
            from: index,
            to: index + 1,
        })
    }

    /// Moves back one step. Always allowed except on the first step.
    pub fn retreat(&mut self) -> Transition {
        let index = self.session.step_index;
        if index == 0 {
            return Transition::new(Outcome::Unchanged);
        }
        self.gate.stop();
        self.session.step_index = index - 1;
        self.enter_current();
        Transition::new(Outcome::Retreated {
            from: index,
            to: index - 1,
        })
    }

    /// Discards every answer and starts over on the first step.
    pub fn restart(&mut self) -> Transition {
        self.gate.reset();
        self.session = Session::new(self.clock.now());
        self.enter_current();
        Transition::new(Outcome::Restarted)
    }

    /// One second of the video countdown. Unlocking latches the session's
    /// gate field.
    pub fn tick(&mut self) -> Transition {
        match self.gate.tick() {
            Some(GateEvent::Unlocked) => {
                self.session.answers.video_unlocked = true;
                Transition::new(Outcome::GateUnlocked)
            }
            None => match self.gate.remaining() {
                Some(remaining) => Transition::new(Outcome::Ticked { remaining }),
                None => Transition::new(Outcome::Unchanged),
            },
        }
    }

    /// Consumes the controller, returning the session.
    #[must_use]
    pub fn into_session(self) -> Session {
        self.session
    }

    fn complete(&mut self) -> Transition {
        if self.session.completed_at.is_none() {
            self.session.completed_at = Some(self.clock.now());
        }
        match self.completion_record() {
            Some(record) => Transition::new(Outcome::Completed(Box::new(record)))
                .with_notice(Notice::Completed),
            None => Transition::new(Outcome::Blocked),
        }
    }

    fn enter_current(&mut self) {
        match self.current_step().on_enter() {
            Some(EnterHook::StartVideoGate) => {
                // An already unlocked gate never re-locks within a session.
                let seconds = if self.session.answers.video_unlocked {
                    0
                } else {
                    self.config.gate_seconds()
                };
                if let Some(GateEvent::Unlocked) = self.gate.start(seconds) {
                    self.session.answers.video_unlocked = true;
                }
            }
            None => {}
        }
    }

    fn require_step(&self, step: StepKey, action: &'static str) -> Option<Transition> {
        let current = self.current_step().key;
        (current != step).then(|| {
            Transition::rejected(ActionError::NotOnStep {
                action,
                step: current,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateState;
    use crate::time::fixed_clock;

    fn controller() -> NavigationController {
        NavigationController::new(WizardConfig::default(), fixed_clock())
    }

    #[test]
    fn advance_is_blocked_until_welcome_answers_are_set() {
        let mut nav = controller();
        assert_eq!(nav.advance().outcome, Outcome::Blocked);
        assert_eq!(nav.session().step_index(), 0);

        nav.apply(Action::Select {
            field: "intent".into(),
            value: "lets_go".into(),
        });
        assert!(!nav.can_proceed());
        nav.apply(Action::Select {
            field: "frequency".into(),
            value: "every_week".into(),
        });
        assert!(nav.can_proceed());
    }

    #[test]
    fn retreat_on_first_step_is_a_no_op() {
        let mut nav = controller();
        let transition = nav.retreat();
        assert_eq!(transition.outcome, Outcome::Unchanged);
        assert!(!transition.mutated());
        assert_eq!(nav.session().step_index(), 0);
    }

    #[test]
    fn unknown_field_and_option_are_rejected_without_change() {
        let mut nav = controller();
        let before = nav.session().clone();

        let unknown_field = nav.apply(Action::Select {
            field: "favoriteColor".into(),
            value: "blue".into(),
        });
        assert_eq!(
            unknown_field.outcome,
            Outcome::Rejected(ActionError::UnknownField("favoriteColor".into()))
        );

        let unknown_option = nav.apply(Action::Select {
            field: "intent".into(),
            value: "maybe".into(),
        });
        assert!(matches!(
            unknown_option.outcome,
            Outcome::Rejected(ActionError::UnknownOption { .. })
        ));

        let wrong_kind = nav.apply(Action::ToggleMulti {
            field: "intent".into(),
            value: "lets_go".into(),
        });
        assert_eq!(
            wrong_kind.outcome,
            Outcome::Rejected(ActionError::KindMismatch {
                field: FieldKey::Intent,
                requested: ActionKind::ToggleMulti,
            })
        );

        assert_eq!(nav.session(), &before);
    }

    #[test]
    fn fields_of_other_steps_are_rejected() {
        let mut nav = controller();
        let transition = nav.apply(Action::ToggleExclusive {
            field: "blockers".into(),
            value: "time".into(),
        });
        assert_eq!(
            transition.outcome,
            Outcome::Rejected(ActionError::FieldNotOnStep {
                field: FieldKey::Blockers,
                step: StepKey::Welcome,
            })
        );
    }

    #[test]
    fn ready_confirmation_only_on_terminal_step() {
        let mut nav = controller();
        assert!(matches!(
            nav.confirm_ready().outcome,
            Outcome::Rejected(ActionError::NotOnStep { .. })
        ));
        assert!(!nav.session().answers().ready());
    }

    #[test]
    fn tick_outside_video_step_does_nothing() {
        let mut nav = controller();
        assert_eq!(nav.gate().state(), GateState::Idle);
        assert_eq!(nav.tick().outcome, Outcome::Unchanged);
    }

    #[test]
    fn missing_video_unlocks_gate_on_entry() {
        let config = WizardConfig::default().with_video_url("").unwrap();
        let mut nav = NavigationController::new(config, fixed_clock());
        nav.apply(Action::Select {
            field: "intent".into(),
            value: "probably".into(),
        });
        nav.apply(Action::Select {
            field: "frequency".into(),
            value: "trying".into(),
        });
        nav.advance();

        assert!(nav.gate().is_unlocked());
        assert!(nav.session().answers().video_unlocked());
    }
}
