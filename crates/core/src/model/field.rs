use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ActionError;

/// Identifies one answer field of the gear-up session.
///
/// The string form matches the key used by the presentation layer and the
/// persisted snapshot (`winUnderstanding`, `helpConfidence`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    Intent,
    Frequency,
    WinUnderstanding,
    Playstyle,
    Motivation,
    Blockers,
    HelpConfidence,
}

impl FieldKey {
    pub const ALL: [FieldKey; 7] = [
        FieldKey::Intent,
        FieldKey::Frequency,
        FieldKey::WinUnderstanding,
        FieldKey::Playstyle,
        FieldKey::Motivation,
        FieldKey::Blockers,
        FieldKey::HelpConfidence,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::Intent => "intent",
            FieldKey::Frequency => "frequency",
            FieldKey::WinUnderstanding => "winUnderstanding",
            FieldKey::Playstyle => "playstyle",
            FieldKey::Motivation => "motivation",
            FieldKey::Blockers => "blockers",
            FieldKey::HelpConfidence => "helpConfidence",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKey {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ActionError::UnknownField(s.to_owned()))
    }
}

/// Answer shape of a field, which decides how a user action mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Exactly one value or none; selecting overwrites.
    Single,
    /// Unbounded set; selecting toggles membership.
    Multi,
    /// Set capped at `limit` members; adds past the cap are refused.
    MultiLimited { limit: usize },
    /// Set with a sentinel member that excludes every other member.
    MultiExclusive { sentinel: String },
}

impl FieldKind {
    /// The action a presentation event must carry to target this kind.
    #[must_use]
    pub fn action_kind(&self) -> ActionKind {
        match self {
            FieldKind::Single => ActionKind::Select,
            FieldKind::Multi => ActionKind::ToggleMulti,
            FieldKind::MultiLimited { .. } => ActionKind::ToggleMultiLimited,
            FieldKind::MultiExclusive { .. } => ActionKind::ToggleExclusive,
        }
    }
}

/// Field-level action requested by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Select,
    ToggleMulti,
    ToggleMultiLimited,
    ToggleExclusive,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::Select => "select",
            ActionKind::ToggleMulti => "toggleMulti",
            ActionKind::ToggleMultiLimited => "toggleMultiLimited",
            ActionKind::ToggleExclusive => "toggleExclusive",
        };
        f.write_str(name)
    }
}
