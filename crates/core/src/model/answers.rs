use crate::model::{FieldKey, Selection};

/// Every answer collected by the wizard.
///
/// Fields are only written through the field mutators, the video gate latch,
/// or the terminal-step confirmation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answers {
    pub(crate) intent: Option<String>,
    pub(crate) frequency: Option<String>,
    pub(crate) video_unlocked: bool,
    pub(crate) watched_short_video: bool,
    pub(crate) win_understanding: Selection,
    pub(crate) playstyle: Selection,
    pub(crate) motivation: Option<String>,
    pub(crate) blockers: Selection,
    pub(crate) help_confidence: Option<String>,
    pub(crate) ready: bool,
}

impl Answers {
    #[must_use]
    pub fn intent(&self) -> Option<&str> {
        self.intent.as_deref()
    }

    #[must_use]
    pub fn frequency(&self) -> Option<&str> {
        self.frequency.as_deref()
    }

    /// Latched by the timed gate on the video step.
    #[must_use]
    pub fn video_unlocked(&self) -> bool {
        self.video_unlocked
    }

    /// Explicit "I watched it" acknowledgement.
    #[must_use]
    pub fn watched_short_video(&self) -> bool {
        self.watched_short_video
    }

    #[must_use]
    pub fn win_understanding(&self) -> &Selection {
        &self.win_understanding
    }

    #[must_use]
    pub fn playstyle(&self) -> &Selection {
        &self.playstyle
    }

    #[must_use]
    pub fn motivation(&self) -> Option<&str> {
        self.motivation.as_deref()
    }

    #[must_use]
    pub fn blockers(&self) -> &Selection {
        &self.blockers
    }

    #[must_use]
    pub fn help_confidence(&self) -> Option<&str> {
        self.help_confidence.as_deref()
    }

    #[must_use]
    pub fn ready(&self) -> bool {
        self.ready
    }

    /// Current value of a single-choice field, `None` for multi-select fields.
    #[must_use]
    pub fn single(&self, field: FieldKey) -> Option<&str> {
        match field {
            FieldKey::Intent => self.intent(),
            FieldKey::Frequency => self.frequency(),
            FieldKey::Motivation => self.motivation(),
            FieldKey::HelpConfidence => self.help_confidence(),
            FieldKey::WinUnderstanding | FieldKey::Playstyle | FieldKey::Blockers => None,
        }
    }

    /// Current members of a multi-select field, `None` for single-choice fields.
    #[must_use]
    pub fn selection(&self, field: FieldKey) -> Option<&Selection> {
        match field {
            FieldKey::WinUnderstanding => Some(&self.win_understanding),
            FieldKey::Playstyle => Some(&self.playstyle),
            FieldKey::Blockers => Some(&self.blockers),
            FieldKey::Intent
            | FieldKey::Frequency
            | FieldKey::Motivation
            | FieldKey::HelpConfidence => None,
        }
    }

    /// Whether `value` is the current choice (or a member) of `field`.
    #[must_use]
    pub fn is_selected(&self, field: FieldKey, value: &str) -> bool {
        match self.selection(field) {
            Some(selection) => selection.contains(value),
            None => self.single(field) == Some(value),
        }
    }

    pub(crate) fn single_mut(&mut self, field: FieldKey) -> Option<&mut Option<String>> {
        match field {
            FieldKey::Intent => Some(&mut self.intent),
            FieldKey::Frequency => Some(&mut self.frequency),
            FieldKey::Motivation => Some(&mut self.motivation),
            FieldKey::HelpConfidence => Some(&mut self.help_confidence),
            FieldKey::WinUnderstanding | FieldKey::Playstyle | FieldKey::Blockers => None,
        }
    }

    pub(crate) fn selection_mut(&mut self, field: FieldKey) -> Option<&mut Selection> {
        match field {
            FieldKey::WinUnderstanding => Some(&mut self.win_understanding),
            FieldKey::Playstyle => Some(&mut self.playstyle),
            FieldKey::Blockers => Some(&mut self.blockers),
            FieldKey::Intent
            | FieldKey::Frequency
            | FieldKey::Motivation
            | FieldKey::HelpConfidence => None,
        }
    }
}
