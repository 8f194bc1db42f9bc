//! Scripted collaborators for orchestration tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use weathervane_core::NetworkError;
use weathervane_weather::{WeatherError, WeatherFetcher, WeatherResponse};

type Scripted = (Result<WeatherResponse, String>, Duration);

/// A fetcher that answers from per-location scripts.
///
/// Errors are scripted as strings and surface as connection failures.
#[derive(Clone, Default)]
pub struct StubFetcher {
    forecasts: Arc<Mutex<HashMap<String, Scripted>>>,
    history: Arc<Mutex<Option<Scripted>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StubFetcher {
    pub fn with_forecast(self, location: &str, result: Result<WeatherResponse, String>) -> Self {
        self.with_forecast_after(location, result, Duration::ZERO)
    }

    pub fn with_forecast_after(
        self,
        location: &str,
        result: Result<WeatherResponse, String>,
        delay: Duration,
    ) -> Self {
        self.forecasts
            .lock()
            .insert(location.to_string(), (result, delay));
        self
    }

    pub fn with_history(self, result: Result<WeatherResponse, String>) -> Self {
        self.with_history_after(result, Duration::ZERO)
    }

    pub fn with_history_after(self, result: Result<WeatherResponse, String>, delay: Duration) -> Self {
        *self.history.lock() = Some((result, delay));
        self
    }

    /// Locations requested so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    async fn answer(scripted: Option<Scripted>, location: &str) -> Result<WeatherResponse, WeatherError> {
        let (result, delay) = scripted
            .unwrap_or_else(|| (Err(format!("nothing scripted for {}", location)), Duration::ZERO));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result.map_err(|e| WeatherError::Network(NetworkError::ConnectionFailed(e)))
    }
}

#[async_trait]
impl WeatherFetcher for StubFetcher {
    async fn forecast(&self, location: &str) -> Result<WeatherResponse, WeatherError> {
        self.calls.lock().push(location.to_string());
        let scripted = self.forecasts.lock().get(location).cloned();
        Self::answer(scripted, location).await
    }

    async fn history(&self, location: &str) -> Result<WeatherResponse, WeatherError> {
        self.calls.lock().push(format!("history:{}", location));
        let scripted = self.history.lock().clone();
        Self::answer(scripted, location).await
    }
}
