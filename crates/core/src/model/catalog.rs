use crate::error::ConfigError;
use crate::model::{FieldKey, FieldKind};

/// One selectable option of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub key: String,
    pub label: String,
    pub sub: Option<String>,
    /// Choosing this option surfaces the support-contacts notice.
    pub offers_support: bool,
}

impl ChoiceOption {
    #[must_use]
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sub: None,
            offers_support: false,
        }
    }

    #[must_use]
    pub fn with_sub(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    #[must_use]
    pub fn offering_support(mut self) -> Self {
        self.offers_support = true;
        self
    }
}

/// Shape, prompt and allowed options of an answer field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: FieldKey,
    pub kind: FieldKind,
    pub prompt: String,
    pub options: Vec<ChoiceOption>,
}

impl FieldSpec {
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&ChoiceOption> {
        self.options.iter().find(|option| option.key == key)
    }

    #[must_use]
    pub fn allows(&self, key: &str) -> bool {
        self.option(key).is_some()
    }

    pub fn option_keys(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|option| option.key.as_str())
    }
}

/// The option tables for every answer field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    fields: Vec<FieldSpec>,
}

impl Catalog {
    /// Builds a catalog from explicit field specs.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a field is missing, has no options, has a zero
    /// limit, or names an exclusive option it does not offer.
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, ConfigError> {
        for key in FieldKey::ALL {
            let spec = fields
                .iter()
                .find(|spec| spec.key == key)
                .ok_or(ConfigError::MissingField(key))?;
            if spec.options.is_empty() {
                return Err(ConfigError::EmptyOptions { field: key });
            }
            match &spec.kind {
                FieldKind::MultiLimited { limit: 0 } => {
                    return Err(ConfigError::ZeroLimit { field: key });
                }
                FieldKind::MultiExclusive { sentinel } if !spec.allows(sentinel) => {
                    return Err(ConfigError::MissingSentinel {
                        field: key,
                        sentinel: sentinel.clone(),
                    });
                }
                _ => {}
            }
        }
        Ok(Self { fields })
    }

    /// The season gear-up option set.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            fields: standard_fields(),
        }
    }

    #[must_use]
    pub fn field(&self, key: FieldKey) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.key == key)
    }

    /// Every option of the winning-understanding field; all of them must be
    /// selected before leaving that step.
    #[must_use]
    pub fn canonical_win_set(&self) -> Vec<&str> {
        self.field(FieldKey::WinUnderstanding)
            .map(|spec| spec.option_keys().collect())
            .unwrap_or_default()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn single(key: FieldKey, prompt: &str, options: Vec<ChoiceOption>) -> FieldSpec {
    FieldSpec {
        key,
        kind: FieldKind::Single,
        prompt: prompt.to_owned(),
        options,
    }
}

fn standard_fields() -> Vec<FieldSpec> {
    vec![
        single(
            FieldKey::Intent,
            "Are you ready to compete this season?",
            vec![
                ChoiceOption::new("lets_go", "Yes, let's go"),
                ChoiceOption::new("probably", "Kinda"),
                ChoiceOption::new("not_sure", "Not sure yet"),
            ],
        ),
        single(
            FieldKey::Frequency,
            "How often do you plan to show up?",
            vec![
                ChoiceOption::new("every_week", "Every Week"),
                ChoiceOption::new("most_weeks", "Most Weeks"),
                ChoiceOption::new("when_i_can", "When I Can"),
                ChoiceOption::new("trying", "Just Trying it Out"),
            ],
        ),
        FieldSpec {
            key: FieldKey::WinUnderstanding,
            kind: FieldKind::Multi,
            prompt: "Pick all that apply.".to_owned(),
            options: vec![
                ChoiceOption::new("weekly", "Completing weekly challenges")
                    .with_sub("You earn rewards + help your team."),
                ChoiceOption::new("featured", "Doing featured challenges on time")
                    .with_sub("Multipliers make early weeks count more."),
                ChoiceOption::new("team", "Helping your team earn season points")
                    .with_sub("Team points → rank up."),
                ChoiceOption::new("playoffs", "Showing up for playoffs")
                    .with_sub("Bigger stakes. Bigger points."),
            ],
        },
        FieldSpec {
            key: FieldKey::Playstyle,
            kind: FieldKind::MultiLimited { limit: 2 },
            prompt: "Choose your playstyle (pick up to 2).".to_owned(),
            options: vec![
                ChoiceOption::new("builder", "Builder").with_sub("Likes making & creating things."),
                ChoiceOption::new("strategist", "Strategist")
                    .with_sub("Likes problem-solving & planning."),
                ChoiceOption::new("designer", "Designer")
                    .with_sub("Likes visuals, polish, and creativity."),
                ChoiceOption::new("explorer", "Explorer")
                    .with_sub("Likes trying new tools and learning fast."),
                ChoiceOption::new("speaker", "Communicator")
                    .with_sub("Likes presenting/explaining ideas."),
                ChoiceOption::new("figuring_out", "Still figuring it out")
                    .with_sub("Totally valid. Start anyway."),
            ],
        },
        single(
            FieldKey::Motivation,
            "Bonus: what are you most excited about?",
            vec![
                ChoiceOption::new("rewards", "Winning rewards"),
                ChoiceOption::new("competition", "Beating other teams"),
                ChoiceOption::new("skills", "Learning real skills"),
                ChoiceOption::new("creating", "Making cool stuff"),
                ChoiceOption::new("new", "Trying something new"),
            ],
        ),
        FieldSpec {
            key: FieldKey::Blockers,
            kind: FieldKind::MultiExclusive {
                sentinel: "none".to_owned(),
            },
            prompt: "What might make it hard some weeks? (Pick any)".to_owned(),
            options: vec![
                ChoiceOption::new("time", "Time / schedule"),
                ChoiceOption::new("tech", "Tech access"),
                ChoiceOption::new("confused", "Not understanding the challenge"),
                ChoiceOption::new("confidence", "Confidence / feeling behind"),
                ChoiceOption::new("none", "Nothing — I'm good"),
            ],
        },
        single(
            FieldKey::HelpConfidence,
            "Do you feel like you know where to get help if you're stuck?",
            vec![
                ChoiceOption::new("yes", "✅ Yes"),
                ChoiceOption::new("not_sure", "🤔 Not sure yet").offering_support(),
            ],
        ),
    ]
}
