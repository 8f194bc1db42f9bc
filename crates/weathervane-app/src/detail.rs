//! Detail screen state machine for one searched location.
//!
//! Mounted by the search orchestrator after a successful search; loads the
//! location's recent history on request.

use std::sync::Arc;

use uuid::Uuid;
use weathervane_weather::projector::{to_daily, to_hourly};
use weathervane_weather::{DailyForecastPoint, DetailRecord, ForecastPoint, WeatherFetcher, WeatherResponse};

use crate::composition::Presentable;
use crate::error::OrchestrationError;
use crate::runtime::{CancelId, Effect, Reducer};

/// Cancel id of the historical fetch, namespaced under the mounting scope.
pub const HISTORICAL_FETCH_ID: &str = "detail.historical";

#[derive(Debug, Clone, PartialEq)]
pub struct DetailState {
    /// Distinguishes successive mounts so their effects never mix.
    pub mount_id: Uuid,
    pub detail: DetailRecord,
    pub is_loading_historical: bool,
    pub hourly_history: Vec<ForecastPoint>,
    pub daily_history: Vec<DailyForecastPoint>,
    pub error: Option<String>,
}

impl DetailState {
    pub fn new(detail: DetailRecord) -> Self {
        Self {
            mount_id: Uuid::new_v4(),
            detail,
            is_loading_historical: false,
            hourly_history: Vec::new(),
            daily_history: Vec::new(),
            error: None,
        }
    }
}

impl Presentable for DetailState {
    fn scope(&self) -> CancelId {
        CancelId::instance("detail", self.mount_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailAction {
    HistoricalForecastsRequested,
    HistoricalFetchSucceeded(WeatherResponse),
    HistoricalFetchFailed(String),
    HistoricalForecastsApplied(WeatherResponse),
}

pub struct DetailReducer {
    fetcher: Arc<dyn WeatherFetcher>,
}

impl DetailReducer {
    pub fn new(fetcher: Arc<dyn WeatherFetcher>) -> Self {
        Self { fetcher }
    }
}

impl Reducer for DetailReducer {
    type State = DetailState;
    type Action = DetailAction;

    fn reduce(&self, state: &mut DetailState, action: DetailAction) -> Effect<DetailAction> {
        match action {
            DetailAction::HistoricalForecastsRequested => {
                state.is_loading_historical = true;
                state.error = None;

                let fetcher = self.fetcher.clone();
                let location = state.detail.city.clone();
                Effect::task(async move {
                    match fetcher.history(&location).await {
                        Ok(response) => DetailAction::HistoricalFetchSucceeded(response),
                        Err(e) => {
                            tracing::warn!("Historical fetch for {:?} failed: {}", location, e);
                            DetailAction::HistoricalFetchFailed(OrchestrationError::Fetch(e).to_string())
                        }
                    }
                })
                .cancellable(HISTORICAL_FETCH_ID)
            }

            DetailAction::HistoricalFetchSucceeded(response) => {
                state.is_loading_historical = false;
                Effect::send(DetailAction::HistoricalForecastsApplied(response))
            }

            DetailAction::HistoricalFetchFailed(message) => {
                state.is_loading_historical = false;
                state.error = Some(message);
                Effect::none()
            }

            DetailAction::HistoricalForecastsApplied(response) => {
                state.hourly_history = to_hourly(&response);
                state.daily_history = to_daily(&response);
                Effect::none()
            }
        }
    }
}
