//! Search history backend trait and error types.

use thiserror::Error;
use weathervane_core::DatabaseError;
use weathervane_weather::SearchRecord;

/// Errors that can occur during search history operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database failure.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Record rejected before reaching storage.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Stored data could not be read back.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Generic error wrapper.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Database(e) => e.user_message(),
            Self::Validation(_) => "The search could not be saved.",
            Self::Storage(_) => "Search history could not be read.",
            Self::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Result type for search history operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage for search history.
///
/// Implementations don't need to be Sync; `SearchClient` serializes access.
pub trait SearchBackend: Send {
    /// All stored searches, most recent observation first.
    fn list_searches(&self) -> StoreResult<Vec<SearchRecord>>;

    /// Insert `record`, or update the stored record with the same city.
    ///
    /// An existing record keeps its id. Returns the record as stored.
    fn upsert(&self, record: &SearchRecord) -> StoreResult<SearchRecord>;

    /// Look up a stored search by exact city name.
    fn find_by_city(&self, city: &str) -> StoreResult<Option<SearchRecord>> {
        Ok(self.list_searches()?.into_iter().find(|r| r.city == city))
    }
}

/// Reject records that cannot be keyed.
pub fn validate_record(record: &SearchRecord) -> StoreResult<()> {
    if record.city.trim().is_empty() {
        return Err(StoreError::validation("City cannot be empty"));
    }
    Ok(())
}
