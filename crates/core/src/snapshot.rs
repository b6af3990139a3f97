//! Serialized form of the session and the merge-over-defaults restore.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SnapshotError;
use crate::model::{Answers, Catalog, FieldKey, FieldKind, Selection, Session};

/// Flat camelCase record persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub step_index: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub intent: Option<String>,
    pub frequency: Option<String>,
    pub watched_short_video: bool,
    pub video_unlocked: bool,
    pub win_understanding: Selection,
    pub playstyle: Selection,
    pub motivation: Option<String>,
    pub blockers: Selection,
    pub help_confidence: Option<String>,
    pub ready: bool,
}

impl From<&Session> for SessionSnapshot {
    fn from(session: &Session) -> Self {
        let answers = session.answers();
        Self {
            step_index: session.step_index(),
            started_at: session.started_at(),
            completed_at: session.completed_at(),
            intent: answers.intent.clone(),
            frequency: answers.frequency.clone(),
            watched_short_video: answers.watched_short_video,
            video_unlocked: answers.video_unlocked,
            win_understanding: answers.win_understanding.clone(),
            playstyle: answers.playstyle.clone(),
            motivation: answers.motivation.clone(),
            blockers: answers.blockers.clone(),
            help_confidence: answers.help_confidence.clone(),
            ready: answers.ready,
        }
    }
}

impl SessionSnapshot {
    fn into_session(self) -> Session {
        Session::from_parts(
            self.step_index,
            self.started_at,
            self.completed_at,
            Answers {
                intent: self.intent,
                frequency: self.frequency,
                video_unlocked: self.video_unlocked,
                watched_short_video: self.watched_short_video,
                win_understanding: self.win_understanding,
                playstyle: self.playstyle,
                motivation: self.motivation,
                blockers: self.blockers,
                help_confidence: self.help_confidence,
                ready: self.ready,
            },
        )
    }
}

/// Serializes a session for the persistence layer.
///
/// # Errors
///
/// Returns `SnapshotError::Encode` if JSON encoding fails.
pub fn encode(session: &Session) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(&SessionSnapshot::from(session))?)
}

/// Where a restored session came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreSource {
    /// Nothing was stored.
    Fresh,
    /// The stored snapshot was used as-is.
    Restored,
    /// The snapshot was unreadable or partly invalid; defaults filled the gaps.
    Recovered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restored {
    pub session: Session,
    pub source: RestoreSource,
}

/// Rebuilds a session from a stored snapshot, merged field by field over
/// `defaults`.
///
/// Keys the snapshot does not know are ignored, values that fail to decode
/// keep their default, option keys outside `catalog` are dropped, and the
/// step index is clamped below `step_count`. Never fails: an unparsable
/// document yields `defaults`.
#[must_use]
pub fn restore(
    raw: Option<&str>,
    defaults: Session,
    catalog: &Catalog,
    step_count: usize,
) -> Restored {
    let Some(raw) = raw else {
        return Restored {
            session: defaults,
            source: RestoreSource::Fresh,
        };
    };
    let recovered = |session| Restored {
        session,
        source: RestoreSource::Recovered,
    };

    let Ok(Value::Object(stored)) = serde_json::from_str::<Value>(raw) else {
        return recovered(defaults);
    };
    let Ok(Value::Object(mut merged)) = serde_json::to_value(SessionSnapshot::from(&defaults))
    else {
        return recovered(defaults);
    };

    let mut clean = true;
    for (key, value) in stored {
        if !merged.contains_key(&key) {
            continue;
        }
        let previous = merged.insert(key.clone(), value);
        if decode(&merged).is_none() {
            clean = false;
            if let Some(previous) = previous {
                merged.insert(key, previous);
            }
        }
    }

    let Some(snapshot) = decode(&merged) else {
        return recovered(defaults);
    };
    let mut session = snapshot.into_session();
    clean &= sanitize(&mut session, catalog, step_count);

    Restored {
        session,
        source: if clean {
            RestoreSource::Restored
        } else {
            RestoreSource::Recovered
        },
    }
}

fn decode(map: &Map<String, Value>) -> Option<SessionSnapshot> {
    serde_json::from_value(Value::Object(map.clone())).ok()
}

/// Brings restored values back inside the catalog's rules. Returns `true`
/// when nothing had to change.
fn sanitize(session: &mut Session, catalog: &Catalog, step_count: usize) -> bool {
    let mut clean = true;

    let last = step_count.saturating_sub(1);
    if session.step_index > last {
        session.step_index = last;
        clean = false;
    }

    for field in FieldKey::ALL {
        let Some(spec) = catalog.field(field) else {
            continue;
        };
        if let Some(slot) = session.answers.single_mut(field) {
            if slot.as_deref().is_some_and(|value| !spec.allows(value)) {
                *slot = None;
                clean = false;
            }
            continue;
        }
        let Some(selection) = session.answers.selection_mut(field) else {
            continue;
        };
        let before = selection.len();
        selection.retain(|value| spec.allows(value));
        match &spec.kind {
            FieldKind::MultiLimited { limit } => selection.truncate(*limit),
            FieldKind::MultiExclusive { sentinel } => {
                if selection.contains(sentinel) && selection.len() > 1 {
                    selection.replace_with(sentinel);
                }
            }
            FieldKind::Single | FieldKind::Multi => {}
        }
        if selection.len() != before {
            clean = false;
        }
    }

    clean
}
