//! Failures surfaced to the user by the orchestrators.
//!
//! Every effect failure is converted into one of these at the boundary and
//! carried back as a `*Failed(String)` action.

use thiserror::Error;
use weathervane_store::StoreError;
use weathervane_weather::WeatherError;

#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error("Failed to fetch data: {0}")]
    Fetch(#[from] WeatherError),

    #[error("Failed to fetch data: {0}")]
    Load(StoreError),

    #[error("Failed to save data: {0}")]
    Save(StoreError),
}

impl OrchestrationError {
    /// Short, non-technical text for a banner or toast.
    pub fn user_message(&self) -> &'static str {
        match self {
            OrchestrationError::Fetch(e) => e.user_message(),
            OrchestrationError::Load(e) | OrchestrationError::Save(e) => e.user_message(),
        }
    }
}
