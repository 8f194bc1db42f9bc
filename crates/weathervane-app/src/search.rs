//! Search screen state machine.
//!
//! Owns the query, the loading flag, the persisted search list and the
//! optional detail child. A settled query fetches a forecast, persists it as
//! a search, reloads the list and mounts the detail for the result.

use std::sync::Arc;

use weathervane_store::SearchClient;
use weathervane_weather::projector::{to_detail_record, to_search_record};
use weathervane_weather::{DetailRecord, SearchRecord, WeatherFetcher, WeatherResponse};

use crate::composition::{present, reduce_presented, PresentationAction};
use crate::detail::{DetailAction, DetailReducer, DetailState};
use crate::error::OrchestrationError;
use crate::runtime::{Effect, Reducer};

/// Forecast fetch and the upsert that follows it; a newer query replaces both.
pub const SEARCH_FETCH_ID: &str = "search.fetch";
pub const SEARCH_HISTORY_ID: &str = "search.history";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub searches: Vec<SearchRecord>,
    pub search_query: String,
    pub is_loading: bool,
    pub error: Option<String>,
    pub detail: Option<DetailState>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchAction {
    QueryChanged(String),
    QueryChangeSettled,
    SearchItemTapped(String),
    FetchSucceeded {
        query: String,
        response: WeatherResponse,
    },
    FetchFailed(String),
    /// The fetched search was stored; carries the detail to show for it.
    SearchPersisted(DetailRecord),
    HistoryLoadRequested,
    HistoryLoaded(Vec<SearchRecord>),
    LoadingReset,
    DetailRequested(DetailRecord),
    ErrorDismissed,
    Detail(PresentationAction<DetailAction>),
}

pub struct SearchReducer {
    fetcher: Arc<dyn WeatherFetcher>,
    searches: SearchClient,
    detail: DetailReducer,
}

impl SearchReducer {
    pub fn new(fetcher: Arc<dyn WeatherFetcher>, searches: SearchClient) -> Self {
        Self {
            detail: DetailReducer::new(fetcher.clone()),
            fetcher,
            searches,
        }
    }

    fn fetch_forecast(&self, query: String) -> Effect<SearchAction> {
        let fetcher = self.fetcher.clone();
        Effect::task(async move {
            match fetcher.forecast(&query).await {
                Ok(response) => SearchAction::FetchSucceeded { query, response },
                Err(e) => {
                    tracing::warn!("Forecast fetch for {:?} failed: {}", query, e);
                    SearchAction::FetchFailed(OrchestrationError::from(e).to_string())
                }
            }
        })
        .cancellable(SEARCH_FETCH_ID)
    }

    fn persist(&self, record: SearchRecord, detail: DetailRecord) -> Effect<SearchAction> {
        let searches = self.searches.clone();
        Effect::task(async move {
            match searches.upsert(record).await {
                Ok(stored) => {
                    tracing::debug!("Stored search {} for {:?}", stored.id, stored.city);
                    SearchAction::SearchPersisted(detail)
                }
                Err(e) => {
                    tracing::warn!("Failed to store search: {}", e);
                    SearchAction::FetchFailed(OrchestrationError::Save(e).to_string())
                }
            }
        })
        .cancellable(SEARCH_FETCH_ID)
    }

    fn load_history(&self) -> Effect<SearchAction> {
        let searches = self.searches.clone();
        Effect::task(async move {
            match searches.list_searches().await {
                Ok(records) => SearchAction::HistoryLoaded(records),
                Err(e) => {
                    tracing::warn!("Failed to load search history: {}", e);
                    SearchAction::FetchFailed(OrchestrationError::Load(e).to_string())
                }
            }
        })
        .cancellable(SEARCH_HISTORY_ID)
    }
}

impl Reducer for SearchReducer {
    type State = SearchState;
    type Action = SearchAction;

    fn reduce(&self, state: &mut SearchState, action: SearchAction) -> Effect<SearchAction> {
        match action {
            SearchAction::QueryChanged(text) => {
                state.search_query = text;
                Effect::none()
            }

            SearchAction::QueryChangeSettled => {
                if state.search_query.trim().is_empty() {
                    return Effect::none();
                }
                state.is_loading = true;
                self.fetch_forecast(state.search_query.clone())
            }

            SearchAction::SearchItemTapped(city) => {
                state.search_query = city.clone();
                Effect::merge([
                    Effect::send(SearchAction::QueryChanged(city)),
                    Effect::send(SearchAction::QueryChangeSettled),
                ])
            }

            SearchAction::FetchSucceeded { query, response } => {
                let Some(record) = to_search_record(&response, &query) else {
                    tracing::warn!("Forecast for {:?} had no current conditions", query);
                    state.is_loading = false;
                    return Effect::none();
                };
                let detail = to_detail_record(&response, &query);
                self.persist(record, detail)
            }

            SearchAction::SearchPersisted(detail) => Effect::merge([
                Effect::send(SearchAction::HistoryLoadRequested),
                Effect::send(SearchAction::DetailRequested(detail)),
                Effect::send(SearchAction::LoadingReset),
            ]),

            SearchAction::FetchFailed(message) => {
                state.is_loading = false;
                state.error = Some(message);
                Effect::none()
            }

            SearchAction::HistoryLoadRequested => self.load_history(),

            SearchAction::HistoryLoaded(records) => {
                state.searches = records;
                Effect::none()
            }

            SearchAction::LoadingReset => {
                state.is_loading = false;
                state.search_query.clear();
                Effect::none()
            }

            SearchAction::DetailRequested(record) => {
                tracing::info!("Showing detail for {}", record.city);
                present(&mut state.detail, DetailState::new(record))
            }

            SearchAction::ErrorDismissed => {
                state.error = None;
                Effect::none()
            }

            SearchAction::Detail(action) => {
                reduce_presented(&self.detail, &mut state.detail, action, |action| {
                    SearchAction::Detail(PresentationAction::Presented(action))
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::runtime::Store;
    use crate::testing::StubFetcher;
    use std::time::Duration;
    use weathervane_store::{SearchBackend, StoreError, StoreResult};

    fn reducer(fetcher: StubFetcher) -> SearchReducer {
        SearchReducer::new(Arc::new(fetcher), SearchClient::in_memory().unwrap())
    }

    fn store_with(fetcher: StubFetcher, searches: SearchClient) -> Store<SearchReducer> {
        Store::new(
            SearchReducer::new(Arc::new(fetcher), searches),
            SearchState::default(),
        )
    }

    fn search(store: &Store<SearchReducer>, query: &str) {
        store.send(SearchAction::QueryChanged(query.to_string()));
        store.send(SearchAction::QueryChangeSettled);
    }

    fn presented(action: DetailAction) -> SearchAction {
        SearchAction::Detail(PresentationAction::Presented(action))
    }

    struct BrokenDisk;

    impl SearchBackend for BrokenDisk {
        fn list_searches(&self) -> StoreResult<Vec<SearchRecord>> {
            Err(StoreError::storage("disk full"))
        }

        fn upsert(&self, _record: &SearchRecord) -> StoreResult<SearchRecord> {
            Err(StoreError::storage("disk full"))
        }
    }

    #[tokio::test]
    async fn test_successful_search_persists_and_shows_detail() {
        let fetcher = StubFetcher::default().with_forecast("New York", Ok(WeatherResponse::mock()));
        let searches = SearchClient::in_memory().unwrap();
        let store = store_with(fetcher, searches.clone());
        let mut transitions = store.transitions();

        search(&store, "New York");

        let state = store
            .wait_for(|s| s.detail.is_some() && !s.searches.is_empty())
            .await
            .unwrap();

        assert!(!state.is_loading);
        assert_eq!(state.search_query, "");
        assert!(state.error.is_none());
        assert_eq!(state.searches.len(), 1);
        assert_eq!(state.searches[0].city, "New York");
        assert_eq!(state.searches[0].temperature, "20.2°C");

        let detail = state.detail.unwrap();
        assert_eq!(detail.detail.city, "New York");
        assert_eq!(detail.detail.weather_code, 1001);
        assert!(!detail.is_loading_historical);

        let mut saw_loading = false;
        while let Ok(t) = transitions.try_recv() {
            if t.action == SearchAction::QueryChangeSettled {
                saw_loading = t.state.is_loading;
            }
        }
        assert!(saw_loading);

        let stored = searches.list_searches().await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_history_loaded_carries_display_values() {
        let fetcher = StubFetcher::default().with_forecast("New York", Ok(WeatherResponse::mock()));
        let store = store_with(fetcher, SearchClient::in_memory().unwrap());
        let mut transitions = store.transitions();

        search(&store, "New York");

        let records = loop {
            let t = transitions.recv().await.unwrap();
            if let SearchAction::HistoryLoaded(records) = &t.action {
                if !records.is_empty() {
                    break records.clone();
                }
            }
        };

        let record = &records[0];
        assert_eq!(record.city, "New York");
        assert_eq!(record.time, "Tue Jul 09 2024 11 AM");
        assert_eq!(record.temperature, "20.2°C");
        assert_eq!(record.temperature_apparent, "20.2°C");
        assert_eq!(record.forecasts.len(), 3);
        assert_eq!(record.forecasts[0].time, "12 PM");
        assert_eq!(record.forecasts[0].temperature, "21.0°C");
        assert_eq!(record.forecasts[2].time, "2 PM");
    }

    #[tokio::test]
    async fn test_mount_and_reset_land_in_one_step() {
        let fetcher = StubFetcher::default().with_forecast("Oslo", Ok(WeatherResponse::mock()));
        let store = store_with(fetcher, SearchClient::in_memory().unwrap());
        let mut states = store.subscribe();

        search(&store, "Oslo");

        loop {
            states.changed().await.unwrap();
            let state = states.borrow_and_update().clone();
            if state.detail.is_some() {
                assert!(!state.is_loading);
                assert_eq!(state.search_query, "");
                break;
            }
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_sets_error() {
        let fetcher = StubFetcher::default().with_forecast("Atlantis", Err("Network error".to_string()));
        let store = store_with(fetcher, SearchClient::in_memory().unwrap());

        search(&store, "Atlantis");

        let state = store.wait_for(|s| s.error.is_some()).await.unwrap();
        assert!(!state.is_loading);
        assert!(state.error.as_deref().unwrap().contains("Network error"));
        assert!(state.error.as_deref().unwrap().starts_with("Failed to fetch data: "));
        assert_eq!(state.search_query, "Atlantis");
        assert!(state.searches.is_empty());
        assert!(state.detail.is_none());
    }

    #[tokio::test]
    async fn test_upsert_failure_is_save_error() {
        let fetcher = StubFetcher::default().with_forecast("Oslo", Ok(WeatherResponse::mock()));
        let store = store_with(fetcher, SearchClient::new(BrokenDisk));

        search(&store, "Oslo");

        let state = store.wait_for(|s| s.error.is_some()).await.unwrap();
        assert_eq!(
            state.error.as_deref(),
            Some("Failed to save data: Storage error: disk full")
        );
        assert!(!state.is_loading);
        assert!(state.detail.is_none());
    }

    #[tokio::test]
    async fn test_history_failure_is_fetch_error() {
        let store = store_with(StubFetcher::default(), SearchClient::new(BrokenDisk));

        store.send(SearchAction::HistoryLoadRequested);

        let state = store.wait_for(|s| s.error.is_some()).await.unwrap();
        assert_eq!(
            state.error.as_deref(),
            Some("Failed to fetch data: Storage error: disk full")
        );
    }

    #[tokio::test]
    async fn test_blank_query_settle_is_inert() {
        let fetcher = StubFetcher::default();
        let store = store_with(fetcher.clone(), SearchClient::in_memory().unwrap());
        let mut transitions = store.transitions();

        search(&store, "   ");

        transitions.recv().await.unwrap();
        let settled = transitions.recv().await.unwrap();
        assert_eq!(settled.action, SearchAction::QueryChangeSettled);
        assert!(!settled.state.is_loading);
        assert!(settled.state.error.is_none());
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_query_wins() {
        let fetcher = StubFetcher::default()
            .with_forecast_after("Paris", Ok(WeatherResponse::mock()), Duration::from_millis(50))
            .with_forecast_after("London", Ok(WeatherResponse::mock()), Duration::from_millis(10));
        let searches = SearchClient::in_memory().unwrap();
        let store = store_with(fetcher.clone(), searches.clone());
        let mut transitions = store.transitions();

        search(&store, "Paris");
        search(&store, "London");

        let state = store.wait_for(|s| s.detail.is_some()).await.unwrap();
        assert_eq!(state.detail.unwrap().detail.city, "London");

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(fetcher.calls(), vec!["Paris", "London"]);
        let stored = searches.list_searches().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].city, "London");

        while let Ok(t) = transitions.try_recv() {
            if let SearchAction::FetchSucceeded { query, .. } = &t.action {
                assert_eq!(query, "London");
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_superseded_fetch_never_lands_across_threads() {
        for _ in 0..10 {
            let fetcher = StubFetcher::default()
                .with_forecast_after("Paris", Ok(WeatherResponse::mock()), Duration::from_millis(20))
                .with_forecast("London", Ok(WeatherResponse::mock()));
            let searches = SearchClient::in_memory().unwrap();
            let store = store_with(fetcher, searches.clone());

            search(&store, "Paris");
            search(&store, "London");

            let state = store
                .wait_for(|s| s.detail.is_some() && !s.searches.is_empty())
                .await
                .unwrap();
            assert_eq!(state.detail.unwrap().detail.city, "London");

            tokio::time::sleep(Duration::from_millis(40)).await;

            let stored = searches.list_searches().await.unwrap();
            assert_eq!(stored.len(), 1);
            assert_eq!(stored[0].city, "London");
            assert_eq!(store.state().searches.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_search_item_tapped_searches_again() {
        let fetcher = StubFetcher::default().with_forecast("Berlin", Ok(WeatherResponse::mock()));
        let store = store_with(fetcher.clone(), SearchClient::in_memory().unwrap());

        store.send(SearchAction::SearchItemTapped("Berlin".to_string()));

        let state = store.wait_for(|s| s.detail.is_some()).await.unwrap();
        assert_eq!(state.detail.unwrap().detail.city, "Berlin");
        assert_eq!(fetcher.calls(), vec!["Berlin"]);
    }

    #[tokio::test]
    async fn test_repeat_search_updates_single_record() {
        let fetcher = StubFetcher::default().with_forecast("Rome", Ok(WeatherResponse::mock()));
        let searches = SearchClient::in_memory().unwrap();
        let store = store_with(fetcher, searches.clone());

        search(&store, "Rome");
        let first = store
            .wait_for(|s| s.detail.is_some() && s.searches.len() == 1)
            .await
            .unwrap();

        search(&store, "Rome");
        store
            .wait_for(|s| s.detail.as_ref().map(|d| d.mount_id) != first.detail.as_ref().map(|d| d.mount_id))
            .await
            .unwrap();

        let stored = searches.list_searches().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, first.searches[0].id);
    }

    #[test]
    fn test_empty_projection_resets_loading() {
        let reducer = reducer(StubFetcher::default());
        let mut state = SearchState {
            search_query: "Nowhere".to_string(),
            is_loading: true,
            ..Default::default()
        };

        let effect = reducer.reduce(
            &mut state,
            SearchAction::FetchSucceeded {
                query: "Nowhere".to_string(),
                response: WeatherResponse::default(),
            },
        );

        assert!(effect.is_none());
        assert!(!state.is_loading);
        assert!(state.error.is_none());
        assert!(state.detail.is_none());
    }

    #[test]
    fn test_error_dismissed_keeps_loading() {
        let reducer = reducer(StubFetcher::default());
        let mut state = SearchState {
            is_loading: true,
            error: Some("boom".to_string()),
            ..Default::default()
        };

        reducer.reduce(&mut state, SearchAction::ErrorDismissed);

        assert!(state.error.is_none());
        assert!(state.is_loading);
    }

    #[test]
    fn test_detail_action_without_detail_is_noop() {
        let reducer = reducer(StubFetcher::default());
        let mut state = SearchState::default();

        let effect = reducer.reduce(&mut state, presented(DetailAction::HistoricalForecastsRequested));

        assert!(effect.is_none());
        assert_eq!(state, SearchState::default());
    }

    #[tokio::test]
    async fn test_detail_history_routes_through_parent() {
        let fetcher = StubFetcher::default().with_history(Ok(WeatherResponse::mock_history()));
        let store = store_with(fetcher, SearchClient::in_memory().unwrap());

        store.send(SearchAction::DetailRequested(DetailRecord::mock()));
        store.send(presented(DetailAction::HistoricalForecastsRequested));

        let state = store
            .wait_for(|s| s.detail.as_ref().is_some_and(|d| d.daily_history.len() == 1))
            .await
            .unwrap();
        let detail = state.detail.unwrap();
        assert!(!detail.is_loading_historical);
        assert_eq!(detail.daily_history[0].temperature_max, "23.0°C");
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_suppresses_late_history() {
        let fetcher = StubFetcher::default()
            .with_history_after(Ok(WeatherResponse::mock_history()), Duration::from_millis(50));
        let store = store_with(fetcher, SearchClient::in_memory().unwrap());
        let mut transitions = store.transitions();

        store.send(SearchAction::DetailRequested(DetailRecord::mock()));
        store.send(presented(DetailAction::HistoricalForecastsRequested));
        store.send(SearchAction::Detail(PresentationAction::Dismiss));

        store.wait_for(|s| s.detail.is_none()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(store.state().detail.is_none());
        while let Ok(t) = transitions.try_recv() {
            assert!(!matches!(
                t.action,
                SearchAction::Detail(PresentationAction::Presented(
                    DetailAction::HistoricalFetchSucceeded(_)
                ))
            ));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_replaced_detail_ignores_previous_mount_history() {
        let fetcher = StubFetcher::default()
            .with_history_after(Ok(WeatherResponse::mock_history()), Duration::from_millis(50));
        let store = store_with(fetcher, SearchClient::in_memory().unwrap());

        store.send(SearchAction::DetailRequested(DetailRecord::mock()));
        store.send(presented(DetailAction::HistoricalForecastsRequested));
        store
            .wait_for(|s| s.detail.as_ref().is_some_and(|d| d.is_loading_historical))
            .await
            .unwrap();

        let mut replacement = DetailRecord::mock();
        replacement.city = "Boston".to_string();
        store.send(SearchAction::DetailRequested(replacement));
        tokio::time::sleep(Duration::from_millis(100)).await;

        let detail = store.state().detail.unwrap();
        assert_eq!(detail.detail.city, "Boston");
        assert!(detail.daily_history.is_empty());
        assert!(!detail.is_loading_historical);
    }
}
