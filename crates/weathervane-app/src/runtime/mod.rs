//! Reducer runtime: stores, effects and cancellation.

pub mod cancel;
pub mod effect;
pub mod store;

pub use cancel::{CancelId, CancelMode, CancelRegistry};
pub use effect::{Effect, Emitter};
pub use store::{Dispatcher, Reducer, RuntimeError, Store, Transition};
