use thiserror::Error;

use crate::model::{ActionKind, FieldKey};
use crate::steps::StepKey;

/// Reasons a presentation event is refused. Refusals never touch the session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ActionError {
    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("field {field} has no option {value:?}")]
    UnknownOption { field: FieldKey, value: String },

    #[error("field {field} does not accept {requested} actions")]
    KindMismatch {
        field: FieldKey,
        requested: ActionKind,
    },

    #[error("field {field} is not shown on step {step}")]
    FieldNotOnStep { field: FieldKey, step: StepKey },

    #[error("{action} is not available on step {step}")]
    NotOnStep { action: &'static str, step: StepKey },
}

/// Invalid wizard configuration or option catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid video embed URL: {0}")]
    InvalidVideoUrl(String),

    #[error("field {field} has a selection limit of zero")]
    ZeroLimit { field: FieldKey },

    #[error("field {field} is missing its exclusive option {sentinel:?}")]
    MissingSentinel { field: FieldKey, sentinel: String },

    #[error("field {field} has no options")]
    EmptyOptions { field: FieldKey },

    #[error("field {0} is missing from the catalog")]
    MissingField(FieldKey),
}

/// Snapshot encoding failures.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("failed to encode session snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}
