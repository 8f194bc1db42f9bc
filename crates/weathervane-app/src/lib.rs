//! Weathervane application layer
//!
//! A small effect runtime (reducers, effects, cancellation) and the search
//! and detail state machines built on it.

pub mod app;
pub mod composition;
pub mod detail;
pub mod error;
pub mod runtime;
pub mod scheduler;
pub mod search;

#[cfg(test)]
pub(crate) mod testing;

pub use app::{App, SearchOutcome};
pub use composition::PresentationAction;
pub use detail::{DetailAction, DetailReducer, DetailState};
pub use error::OrchestrationError;
pub use scheduler::{Debouncer, QueryInput};
pub use search::{SearchAction, SearchReducer, SearchState};
