use serde::{Deserialize, Deserializer, de};
use url::Url;

use crate::error::ConfigError;

const DEFAULT_VIDEO_URL: &str = "https://www.youtube.com/embed/dQw4w9WgXcQ";

/// How the video step decides the user has watched the briefing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoPolicy {
    /// The timed gate alone unlocks the step.
    TimerOnly,
    /// The timed gate must unlock and the user must click "I watched it".
    #[default]
    TimerAndAcknowledge,
}

/// Season-level knobs for the wizard. Every field has a default so partial
/// config files are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    pub season_label: String,
    pub export_version: String,
    /// Blank text in a config file means "no video".
    #[serde(deserialize_with = "deserialize_video_url")]
    pub video_embed_url: Option<Url>,
    pub video_min_seconds: u32,
    pub video_policy: VideoPolicy,
    pub support_contacts: Vec<String>,
    pub tips: Vec<String>,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            season_label: "Spring Season".to_owned(),
            export_version: "vesl_gearup_v1".to_owned(),
            video_embed_url: Url::parse(DEFAULT_VIDEO_URL).ok(),
            video_min_seconds: 12,
            video_policy: VideoPolicy::default(),
            support_contacts: vec![
                "Your teacher or coach".to_owned(),
                "The platform Help links".to_owned(),
            ],
            tips: vec![
                "This takes ~5 minutes. No grades—just gear-up.".to_owned(),
                "Showing up on time matters: featured weeks hit harder.".to_owned(),
                "Consistency beats perfection. Submit something every week.".to_owned(),
                "Team points = States. Your weekly work helps everyone.".to_owned(),
            ],
        }
    }
}

impl WizardConfig {
    /// Sets the embed URL from raw text; blank text removes the video.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidVideoUrl` if the text is not a valid URL.
    pub fn with_video_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.video_embed_url = parse_video_url(raw)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_video_seconds(mut self, seconds: u32) -> Self {
        self.video_min_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_video_policy(mut self, policy: VideoPolicy) -> Self {
        self.video_policy = policy;
        self
    }

    /// Countdown length for the video gate. Zero when there is no video to
    /// watch, so unreachable content never blocks progress.
    #[must_use]
    pub fn gate_seconds(&self) -> u32 {
        if self.video_embed_url.is_some() {
            self.video_min_seconds
        } else {
            0
        }
    }

    /// Footer tip used when a step has none of its own.
    #[must_use]
    pub fn fallback_tip(&self) -> Option<&str> {
        self.tips.first().map(String::as_str)
    }
}

fn parse_video_url(raw: &str) -> Result<Option<Url>, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Url::parse(trimmed)
        .map(Some)
        .map_err(|_| ConfigError::InvalidVideoUrl(trimmed.to_owned()))
}

fn deserialize_video_url<'de, D>(deserializer: D) -> Result<Option<Url>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_video_url(&raw).map_err(de::Error::custom),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: WizardConfig =
            serde_json::from_str(r#"{"season_label":"Fall Season","video_policy":"timer_only"}"#)
                .unwrap();
        assert_eq!(config.season_label, "Fall Season");
        assert_eq!(config.video_policy, VideoPolicy::TimerOnly);
        assert_eq!(config.video_min_seconds, 12);
        assert_eq!(config.export_version, "vesl_gearup_v1");
    }

    #[test]
    fn missing_video_means_zero_second_gate() {
        let config = WizardConfig::default().with_video_url("  ").unwrap();
        assert_eq!(config.gate_seconds(), 0);

        let config = config.with_video_url("https://player.vimeo.com/video/1").unwrap();
        assert_eq!(config.gate_seconds(), 12);
    }

    #[test]
    fn invalid_video_url_is_rejected() {
        let err = WizardConfig::default().with_video_url("not a url").unwrap_err();
        assert_eq!(err, ConfigError::InvalidVideoUrl("not a url".into()));
    }

    #[test]
    fn blank_video_url_in_config_file_removes_video() {
        for raw in [
            r#"{"video_embed_url":""}"#,
            r#"{"video_embed_url":"   "}"#,
            r#"{"video_embed_url":null}"#,
        ] {
            let config: WizardConfig = serde_json::from_str(raw).unwrap();
            assert_eq!(config.video_embed_url, None, "{raw}");
            assert_eq!(config.gate_seconds(), 0, "{raw}");
        }

        let config: WizardConfig =
            serde_json::from_str(r#"{"video_embed_url":" https://player.vimeo.com/video/1 "}"#)
                .unwrap();
        assert_eq!(
            config.video_embed_url.as_ref().map(Url::as_str),
            Some("https://player.vimeo.com/video/1")
        );

        let err = serde_json::from_str::<WizardConfig>(r#"{"video_embed_url":"not a url"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid video embed URL"), "{err}");
    }
}
