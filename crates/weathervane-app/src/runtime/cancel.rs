//! Cancellation ids and the per-store registry of in-flight work.
//!
//! Every cancellable scope gets an entry holding a generation and a
//! `CancellationToken`. Actions emitted by async work carry tickets naming
//! the generations they were started under; the store drops any action whose
//! tickets no longer match, so cancelled work can never land a result.

use std::collections::HashMap;
use std::fmt;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Identifier of a cancellable scope.
///
/// Nested scopes are written `outer/inner`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CancelId(String);

impl CancelId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Id for one mounted instance, e.g. `detail:<uuid>`.
    pub fn instance(name: &str, id: Uuid) -> Self {
        Self(format!("{}:{}", name, id))
    }

    /// This id namespaced under `scope`.
    pub fn within(&self, scope: &CancelId) -> Self {
        Self(format!("{}/{}", scope.0, self.0))
    }

    /// True if this id is nested (at any depth) under `scope`.
    pub fn is_within(&self, scope: &CancelId) -> bool {
        self.0
            .strip_prefix(scope.0.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CancelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CancelId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for CancelId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelMode {
    /// Cancel whatever is running under the id, then start fresh.
    Replace,
    /// Join the running group under the id, if any.
    Group,
}

/// Proof that an action was produced under a particular generation of a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    id: CancelId,
    generation: u64,
}

#[derive(Debug)]
struct Entry {
    generation: u64,
    token: CancellationToken,
    live: usize,
}

#[derive(Debug, Default)]
pub struct CancelRegistry {
    entries: HashMap<CancelId, Entry>,
    next_generation: u64,
}

impl CancelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, id: CancelId, parent: &CancellationToken) -> (Ticket, CancellationToken) {
        self.next_generation += 1;
        let token = parent.child_token();
        let generation = self.next_generation;
        self.entries.insert(
            id.clone(),
            Entry {
                generation,
                token: token.clone(),
                live: 0,
            },
        );
        (Ticket { id, generation }, token)
    }

    /// Open scope `id` beneath `parent`, returning its ticket and token.
    pub fn enter(
        &mut self,
        id: CancelId,
        mode: CancelMode,
        parent: &CancellationToken,
    ) -> (Ticket, CancellationToken) {
        let existing = self
            .entries
            .get(&id)
            .map(|e| (e.generation, e.token.clone()));

        match (mode, existing) {
            (CancelMode::Group, Some((generation, token))) if !token.is_cancelled() => {
                (Ticket { id, generation }, token)
            }
            (CancelMode::Replace, Some((_, token))) => {
                tracing::debug!("Cancelling in-flight work for {}", id);
                token.cancel();
                self.insert(id, parent)
            }
            _ => self.insert(id, parent),
        }
    }

    /// Count one more unit of running work under every ticket.
    pub fn retain(&mut self, tickets: &[Ticket]) {
        for ticket in tickets {
            if let Some(entry) = self.current_mut(ticket) {
                entry.live += 1;
            }
        }
    }

    /// Release one unit of work under every ticket.
    pub fn finish(&mut self, tickets: &[Ticket]) {
        for ticket in tickets {
            if let Some(entry) = self.current_mut(ticket) {
                entry.live = entry.live.saturating_sub(1);
            }
            self.release_if_idle(ticket);
        }
    }

    /// Drop the entry for `ticket` if nothing is running under it.
    pub fn release_if_idle(&mut self, ticket: &Ticket) {
        if self
            .entries
            .get(&ticket.id)
            .is_some_and(|e| e.generation == ticket.generation && e.live == 0)
        {
            self.entries.remove(&ticket.id);
        }
    }

    /// Cancel `id` and every scope nested under it.
    pub fn cancel(&mut self, id: &CancelId) {
        let doomed: Vec<CancelId> = self
            .entries
            .keys()
            .filter(|key| *key == id || key.is_within(id))
            .cloned()
            .collect();

        for key in doomed {
            if let Some(entry) = self.entries.remove(&key) {
                tracing::debug!("Cancelled {}", key);
                entry.token.cancel();
            }
        }
    }

    /// True while every ticket still names the current generation of its scope.
    pub fn is_live(&self, tickets: &[Ticket]) -> bool {
        tickets.iter().all(|t| {
            self.entries
                .get(&t.id)
                .is_some_and(|e| e.generation == t.generation)
        })
    }

    pub fn is_active(&self, id: &CancelId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn current_mut(&mut self, ticket: &Ticket) -> Option<&mut Entry> {
        self.entries
            .get_mut(&ticket.id)
            .filter(|e| e.generation == ticket.generation)
    }
}
