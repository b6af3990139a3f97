use chrono::{DateTime, Utc};

use crate::model::Answers;

/// The single mutable gear-up session owned by a navigation controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub(crate) step_index: usize,
    started_at: DateTime<Utc>,
    pub(crate) completed_at: Option<DateTime<Utc>>,
    pub(crate) answers: Answers,
}

impl Session {
    /// A fresh session with every answer at its default.
    #[must_use]
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            step_index: 0,
            started_at,
            completed_at: None,
            answers: Answers::default(),
        }
    }

    pub(crate) fn from_parts(
        step_index: usize,
        started_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
        answers: Answers,
    ) -> Self {
        Self {
            step_index,
            started_at,
            completed_at,
            answers,
        }
    }

    #[must_use]
    pub fn step_index(&self) -> usize {
        self.step_index
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Completed and confirmed ready; drives the "Season Ready" status.
    #[must_use]
    pub fn is_season_ready(&self) -> bool {
        self.is_complete() && self.answers.ready
    }
}
