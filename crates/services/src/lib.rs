#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod gate_ticker;
pub mod onboarding;

pub use gearup_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, OnboardingError};
pub use gate_ticker::{GateTicker, Ticks};
pub use onboarding::OnboardingService;
