//! Debounced query input.
//!
//! Keystrokes update the query immediately; the settle action that starts a
//! search is only dispatched once typing has paused for the configured delay.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::runtime::Dispatcher;
use crate::search::SearchAction;

/// Runs the most recent callback after a quiet period.
///
/// Each `call` supersedes the previous one. The generation check covers the
/// window where a timer has already fired but not yet been aborted.
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `f`; must be called from within a tokio runtime.
    pub fn call<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let current = self.generation.clone();
        let delay = self.delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if current.load(Ordering::SeqCst) == generation {
                f();
            }
        });

        if let Some(previous) = self.pending.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Drop the scheduled callback, if any.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(previous) = self.pending.lock().take() {
            previous.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.get_mut().take() {
            pending.abort();
        }
    }
}

/// Text-field adapter for the search store.
pub struct QueryInput {
    dispatcher: Dispatcher<SearchAction>,
    debouncer: Debouncer,
}

impl QueryInput {
    pub fn new(dispatcher: Dispatcher<SearchAction>, delay: Duration) -> Self {
        Self {
            dispatcher,
            debouncer: Debouncer::new(delay),
        }
    }

    /// The query text changed; search once typing settles.
    pub fn changed(&self, text: impl Into<String>) {
        self.dispatcher.send(SearchAction::QueryChanged(text.into()));
        let dispatcher = self.dispatcher.clone();
        self.debouncer
            .call(move || dispatcher.send(SearchAction::QueryChangeSettled));
    }

    /// Search for `text` now, skipping the quiet period.
    pub fn submit(&self, text: impl Into<String>) {
        self.debouncer.cancel();
        self.dispatcher.send(SearchAction::QueryChanged(text.into()));
        self.dispatcher.send(SearchAction::QueryChangeSettled);
    }
}
