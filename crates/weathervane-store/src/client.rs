//! Async access to a search history backend.
//!
//! `SearchClient` owns the backend behind a mutex and runs every call on the
//! blocking pool, so all reads observe earlier writes from this process.

use std::sync::Arc;

use parking_lot::Mutex;
use weathervane_weather::SearchRecord;

use crate::backend::{SearchBackend, StoreError, StoreResult};
use crate::sqlite::SqliteSearchStore;

#[derive(Clone)]
pub struct SearchClient {
    backend: Arc<Mutex<Box<dyn SearchBackend>>>,
}

impl SearchClient {
    pub fn new(backend: impl SearchBackend + 'static) -> Self {
        Self {
            backend: Arc::new(Mutex::new(Box::new(backend))),
        }
    }

    /// Create a new SQLite-backed search client.
    pub fn sqlite(store: SqliteSearchStore) -> Self {
        Self::new(store)
    }

    /// Fresh in-memory SQLite store.
    pub fn in_memory() -> StoreResult<Self> {
        Ok(Self::sqlite(SqliteSearchStore::in_memory()?))
    }

    async fn with_backend<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn SearchBackend) -> StoreResult<T> + Send + 'static,
    {
        let backend = self.backend.clone();
        tokio::task::spawn_blocking(move || {
            let guard = backend.lock();
            op(&**guard)
        })
        .await
        .map_err(|e| StoreError::Other(anyhow::anyhow!("Storage task failed: {}", e)))?
    }

    /// List stored searches, most recent observation first.
    pub async fn list_searches(&self) -> StoreResult<Vec<SearchRecord>> {
        self.with_backend(|backend| backend.list_searches()).await
    }

    /// Insert or update the search for `record.city`.
    pub async fn upsert(&self, record: SearchRecord) -> StoreResult<SearchRecord> {
        self.with_backend(move |backend| backend.upsert(&record)).await
    }

    pub async fn find_by_city(&self, city: &str) -> StoreResult<Option<SearchRecord>> {
        let city = city.to_string();
        self.with_backend(move |backend| backend.find_by_city(&city))
            .await
    }
}

impl std::fmt::Debug for SearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchClient").finish_non_exhaustive()
    }
}
