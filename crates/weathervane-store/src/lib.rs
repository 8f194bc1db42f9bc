//! Search history persistence for Weathervane.

pub mod backend;
pub mod client;
pub mod sqlite;

pub use backend::{SearchBackend, StoreError, StoreResult};
pub use client::SearchClient;
pub use sqlite::SqliteSearchStore;
