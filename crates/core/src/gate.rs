//! Countdown that unlocks progression on the video step.
//!
//! The gate does not own a timer. Whoever drives it calls [`TimedGate::tick`]
//! once per second (a tokio interval in the app, a loop in tests), so the
//! countdown is independent of render cycles and needs no wall clock to test.

/// Gate lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Idle,
    Running {
        remaining: u32,
    },
    Unlocked,
}

/// Emitted on the transition into `Unlocked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    Unlocked,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimedGate {
    state: GateState,
}

impl TimedGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> GateState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.state, GateState::Running { .. })
    }

    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        matches!(self.state, GateState::Unlocked)
    }

    /// Seconds left while running.
    #[must_use]
    pub fn remaining(&self) -> Option<u32> {
        match self.state {
            GateState::Running { remaining } => Some(remaining),
            GateState::Idle | GateState::Unlocked => None,
        }
    }

    /// (Re)starts the countdown from `seconds`, superseding any run in
    /// progress. A zero duration unlocks immediately.
    pub fn start(&mut self, seconds: u32) -> Option<GateEvent> {
        if seconds == 0 {
            self.state = GateState::Unlocked;
            return Some(GateEvent::Unlocked);
        }
        self.state = GateState::Running { remaining: seconds };
        None
    }

    /// Advances a running countdown by one second.
    pub fn tick(&mut self) -> Option<GateEvent> {
        let GateState::Running { remaining } = self.state else {
            return None;
        };
        let remaining = remaining.saturating_sub(1);
        if remaining == 0 {
            self.state = GateState::Unlocked;
            return Some(GateEvent::Unlocked);
        }
        self.state = GateState::Running { remaining };
        None
    }

    /// Abandons a running countdown. An unlocked gate stays unlocked.
    pub fn stop(&mut self) {
        if self.is_running() {
            self.state = GateState::Idle;
        }
    }

    /// Back to `Idle` regardless of state; used by restart.
    pub fn reset(&mut self) {
        self.state = GateState::Idle;
    }
}
