use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::WizardConfig;
use crate::model::{Selection, Session};

/// Answer block of the completion record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionAnswers {
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

/// Versioned record handed to download/notify collaborators once the
/// terminal step is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub version: String,
    pub season_label: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub answers: CompletionAnswers,
}

impl CompletionRecord {
    /// Builds the record, or `None` while the session is not complete.
    #[must_use]
    pub fn from_session(session: &Session, config: &WizardConfig) -> Option<Self> {
        let completed_at = session.completed_at()?;
        let answers = session.answers();
        Some(Self {
            version: config.export_version.clone(),
            season_label: config.season_label.clone(),
            started_at: session.started_at(),
            completed_at,
            answers: CompletionAnswers {
                intent: answers.intent().map(str::to_owned),
                frequency: answers.frequency().map(str::to_owned),
                watched_short_video: answers.watched_short_video(),
                video_unlocked: answers.video_unlocked(),
                win_understanding: answers.win_understanding().clone(),
                playstyle: answers.playstyle().clone(),
                motivation: answers.motivation().map(str::to_owned),
                blockers: answers.blockers().clone(),
                help_confidence: answers.help_confidence().map(str::to_owned),
                ready: answers.ready(),
            },
        })
    }

    /// Download name, e.g. `vesl-gearup-2023-11-14-22-13-20.json`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!(
            "vesl-gearup-{}.json",
            self.completed_at.format("%Y-%m-%d-%H-%M-%S")
        )
    }

    /// Pretty-printed JSON body.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn incomplete_session_has_no_record() {
        let session = Session::new(fixed_now());
        assert!(CompletionRecord::from_session(&session, &WizardConfig::default()).is_none());
    }

    #[test]
    fn record_serializes_with_stable_keys() {
        let mut session = Session::new(fixed_now());
        session.completed_at = Some(fixed_now());
        session.answers.ready = true;
        session.answers.blockers.insert("time");

        let record = CompletionRecord::from_session(&session, &WizardConfig::default()).unwrap();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["version"], "vesl_gearup_v1");
        assert_eq!(value["seasonLabel"], "Spring Season");
        assert_eq!(value["startedAt"], "2023-11-14T22:13:20Z");
        assert_eq!(value["answers"]["blockers"], serde_json::json!(["time"]));
        assert_eq!(value["answers"]["ready"], true);
        assert_eq!(value["answers"]["intent"], serde_json::Value::Null);
        assert_eq!(record.file_name(), "vesl-gearup-2023-11-14-22-13-20.json");
    }
}
