//! Application wiring.
//!
//! Builds the collaborators from `Config` and hands them to the search store.
//! Nothing here is global; each `App` owns its own store and database handle.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::broadcast::error::RecvError;
use weathervane_core::{AppError, Config};
use weathervane_store::{SearchClient, SqliteSearchStore};
use weathervane_weather::{WeatherFetcher, WeatherProvider};

use crate::detail::DetailState;
use crate::runtime::{RuntimeError, Store};
use crate::scheduler::QueryInput;
use crate::search::{SearchAction, SearchReducer, SearchState};

/// How a submitted search settled.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The search was saved and its detail is showing.
    Found(DetailState),
    /// The fetch or save failed; carries the message shown to the user.
    Failed(String),
    /// The forecast arrived without current conditions; nothing was saved.
    NoConditions,
}

pub struct App {
    store: Store<SearchReducer>,
    input: QueryInput,
    searches: SearchClient,
}

impl App {
    /// Start the app from configuration. Must be called within a tokio runtime.
    ///
    /// Invalid configuration is rejected as `AppError::Config`.
    pub fn new(config: Config) -> Result<Self, AppError> {
        weathervane_core::init()?;
        config.ensure_valid()?;

        let provider =
            WeatherProvider::from_config(&config.api).context("Failed to create weather provider")?;

        let db_path = config.database_path();
        let store = SqliteSearchStore::new(&db_path)
            .with_context(|| format!("Failed to open search history at {}", db_path.display()))?;

        tracing::info!("Search history at {}", db_path.display());

        Ok(Self::with_parts(
            Arc::new(provider),
            SearchClient::sqlite(store),
            Duration::from_millis(config.search.debounce_ms),
        ))
    }

    /// Start the app from explicit collaborators.
    pub fn with_parts(
        fetcher: Arc<dyn WeatherFetcher>,
        searches: SearchClient,
        debounce: Duration,
    ) -> Self {
        let store = Store::new(
            SearchReducer::new(fetcher, searches.clone()),
            SearchState::default(),
        );
        let input = QueryInput::new(store.dispatcher(), debounce);

        store.send(SearchAction::HistoryLoadRequested);
        tracing::info!("Weathervane started");

        Self {
            store,
            input,
            searches,
        }
    }

    pub fn state(&self) -> SearchState {
        self.store.state()
    }

    pub fn send(&self, action: SearchAction) {
        self.store.send(action)
    }

    /// Debounced query input bound to this app's store.
    pub fn input(&self) -> &QueryInput {
        &self.input
    }

    pub fn store(&self) -> &Store<SearchReducer> {
        &self.store
    }

    pub fn searches(&self) -> &SearchClient {
        &self.searches
    }

    pub async fn wait_for<F>(&self, predicate: F) -> Result<SearchState, RuntimeError>
    where
        F: FnMut(&SearchState) -> bool,
    {
        self.store.wait_for(predicate).await
    }

    /// Submit `query` and wait until the search settles.
    pub async fn search(&self, query: impl Into<String>) -> Result<SearchOutcome, RuntimeError> {
        let query = query.into();
        if query.trim().is_empty() {
            return Ok(SearchOutcome::Failed("Enter a city to search".to_string()));
        }

        let mut transitions = self.store.transitions();
        self.input.submit(query);

        loop {
            let transition = match transitions.recv().await {
                Ok(transition) => transition,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Missed {} transitions while waiting for a search", skipped);
                    continue;
                }
                Err(RecvError::Closed) => return Err(RuntimeError::Closed),
            };

            match &transition.action {
                SearchAction::FetchFailed(message) => {
                    return Ok(SearchOutcome::Failed(message.clone()));
                }
                SearchAction::FetchSucceeded { .. } if !transition.state.is_loading => {
                    return Ok(SearchOutcome::NoConditions);
                }
                SearchAction::LoadingReset => {
                    if let Some(detail) = &transition.state.detail {
                        return Ok(SearchOutcome::Found(detail.clone()));
                    }
                }
                _ => {}
            }
        }
    }

    /// Stop the store and cancel in-flight work.
    pub fn shutdown(&self) {
        tracing::info!("Shutting down");
        self.store.shutdown();
    }
}
