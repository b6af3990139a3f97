#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod gate;
pub mod model;
pub mod mutators;
pub mod navigation;
pub mod snapshot;
pub mod steps;
pub mod time;

pub use config::{VideoPolicy, WizardConfig};
pub use error::{ActionError, ConfigError, SnapshotError};
pub use gate::{GateEvent, GateState, TimedGate};
pub use navigation::{Action, NavigationController, Outcome, Transition};
pub use steps::{StepDefinition, StepKey, StepTable};
pub use time::Clock;
