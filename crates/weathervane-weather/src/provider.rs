use async_trait::async_trait;
use reqwest::{Client, Url};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use weathervane_core::{ApiConfig, ReqwestErrorExt};

use crate::response::WeatherResponse;
use crate::types::WeatherError;

const FORECAST_PATH: &str = "forecast";
const HISTORY_PATH: &str = "history/recent";

/// Source of weather timelines for a free-text location.
#[async_trait]
pub trait WeatherFetcher: Send + Sync {
    /// Current conditions plus minutely, hourly and daily forecasts.
    async fn forecast(&self, location: &str) -> Result<WeatherResponse, WeatherError>;

    /// Recent historical hourly and daily readings.
    async fn history(&self, location: &str) -> Result<WeatherResponse, WeatherError>;
}

/// Tomorrow.io v4 weather API client.
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherProvider {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        Url::parse(base_url).map_err(|e| WeatherError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Build a provider from the `[api]` config section.
    pub fn from_config(api: &ApiConfig) -> Result<Self, WeatherError> {
        let api_key = api.resolved_api_key();
        if api_key.is_none() {
            tracing::warn!("No weather API key configured; requests will likely be rejected");
        }
        Self::new(&api.base_url, api_key, Duration::from_secs(api.timeout_secs))
    }

    async fn fetch(&self, path: &str, location: &str) -> Result<WeatherResponse, WeatherError> {
        let url = format!("{}/{}", self.base_url, path);

        let mut request = self.client.get(&url).query(&[("location", location)]);
        if let Some(key) = &self.api_key {
            request = request.query(&[("apikey", key.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        self.handle_response(response).await
    }

    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<WeatherResponse, WeatherError> {
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("Weather API returned {}: {}", status, message);
            return Err(WeatherError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        serde_json::from_str(&body).map_err(|e| WeatherError::Decode(e.to_string()))
    }
}

#[async_trait]
impl WeatherFetcher for WeatherProvider {
    #[instrument(skip(self), level = "info")]
    async fn forecast(&self, location: &str) -> Result<WeatherResponse, WeatherError> {
        let response = self.fetch(FORECAST_PATH, location).await?;
        tracing::debug!(
            "Fetched forecast: {} minutely, {} hourly, {} daily",
            response.minutely().len(),
            response.hourly().len(),
            response.daily().len()
        );
        Ok(response)
    }

    #[instrument(skip(self), level = "info")]
    async fn history(&self, location: &str) -> Result<WeatherResponse, WeatherError> {
        let response = self.fetch(HISTORY_PATH, location).await?;
        tracing::debug!(
            "Fetched history: {} hourly, {} daily",
            response.hourly().len(),
            response.daily().len()
        );
        Ok(response)
    }
}
