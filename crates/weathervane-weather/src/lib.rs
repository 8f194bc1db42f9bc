//! Weather data for Weathervane
//!
//! Tomorrow.io response model, domain records, the weather-code table,
//! response projection and the HTTP provider.

pub mod format;
pub mod projector;
pub mod provider;
pub mod response;
pub mod types;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use provider::{WeatherFetcher, WeatherProvider};
pub use response::WeatherResponse;
pub use types::*;
