//! Effects returned by reducers.
//!
//! An `Effect` describes work; the store decides when and where it runs.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use super::cancel::{CancelId, CancelMode};

/// Handle given to async work for posting actions back to its store.
pub struct Emitter<A> {
    sink: Arc<dyn Fn(A) + Send + Sync>,
}

impl<A> Clone for Emitter<A> {
    fn clone(&self) -> Self {
        Self {
            sink: self.sink.clone(),
        }
    }
}

impl<A: Send + 'static> Emitter<A> {
    pub fn new(sink: impl Fn(A) + Send + Sync + 'static) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }

    /// Post an action. Silently dropped if the store is gone.
    pub fn emit(&self, action: A) {
        (self.sink)(action)
    }

    /// Emitter for a child action type, embedding each action into `A`.
    pub fn embed<C: Send + 'static>(&self, f: Arc<dyn Fn(C) -> A + Send + Sync>) -> Emitter<C> {
        let sink = self.sink.clone();
        Emitter {
            sink: Arc::new(move |action: C| sink(f(action))),
        }
    }
}

type Work<A> = Box<dyn FnOnce(Emitter<A>) -> BoxFuture<'static, ()> + Send>;

pub enum Effect<A> {
    None,
    /// Reduced in the same queue step as the action that produced it.
    Send(A),
    Run(Work<A>),
    Cancellable {
        id: CancelId,
        mode: CancelMode,
        effect: Box<Effect<A>>,
    },
    Cancel(CancelId),
    Merge(Vec<Effect<A>>),
}

impl<A: Send + 'static> Effect<A> {
    pub fn none() -> Self {
        Self::None
    }

    pub fn send(action: A) -> Self {
        Self::Send(action)
    }

    /// Async work that may emit any number of actions.
    pub fn run<F, Fut>(work: F) -> Self
    where
        F: FnOnce(Emitter<A>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::Run(Box::new(move |emitter| work(emitter).boxed()))
    }

    /// Async work that resolves to exactly one action.
    pub fn task<Fut>(future: Fut) -> Self
    where
        Fut: Future<Output = A> + Send + 'static,
    {
        Self::run(move |emitter| async move { emitter.emit(future.await) })
    }

    pub fn merge(effects: impl IntoIterator<Item = Effect<A>>) -> Self {
        let mut effects: Vec<_> = effects.into_iter().filter(|e| !e.is_none()).collect();
        match effects.len() {
            0 => Self::None,
            1 => effects.remove(0),
            _ => Self::Merge(effects),
        }
    }

    pub fn cancel(id: impl Into<CancelId>) -> Self {
        Self::Cancel(id.into())
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Start this work under `id`, cancelling whatever is still running
    /// under the same id.
    pub fn cancellable(self, id: impl Into<CancelId>) -> Self {
        if self.is_none() {
            return self;
        }
        Self::Cancellable {
            id: id.into(),
            mode: CancelMode::Replace,
            effect: Box::new(self),
        }
    }

    /// Group this work under `scope` so that cancelling the scope stops all
    /// of it. Ids used inside are namespaced to the scope.
    pub fn scoped(self, scope: &CancelId) -> Self {
        match self.namespaced(scope) {
            Self::None => Self::None,
            effect => Self::Cancellable {
                id: scope.clone(),
                mode: CancelMode::Group,
                effect: Box::new(effect),
            },
        }
    }

    fn namespaced(self, scope: &CancelId) -> Self {
        match self {
            Self::Cancellable { id, mode, effect } => Self::Cancellable {
                id: id.within(scope),
                mode,
                effect: Box::new(effect.namespaced(scope)),
            },
            Self::Cancel(id) => Self::Cancel(id.within(scope)),
            Self::Merge(effects) => {
                Self::Merge(effects.into_iter().map(|e| e.namespaced(scope)).collect())
            }
            other => other,
        }
    }

    /// Lift into a parent action type.
    pub fn map<B: Send + 'static>(self, f: impl Fn(A) -> B + Send + Sync + 'static) -> Effect<B> {
        self.map_shared(Arc::new(f))
    }

    fn map_shared<B: Send + 'static>(self, f: Arc<dyn Fn(A) -> B + Send + Sync>) -> Effect<B> {
        match self {
            Self::None => Effect::None,
            Self::Send(action) => Effect::Send(f(action)),
            Self::Run(work) => Effect::Run(Box::new(move |emitter: Emitter<B>| work(emitter.embed(f)))),
            Self::Cancellable { id, mode, effect } => Effect::Cancellable {
                id,
                mode,
                effect: Box::new(effect.map_shared(f)),
            },
            Self::Cancel(id) => Effect::Cancel(id),
            Self::Merge(effects) => Effect::Merge(
                effects
                    .into_iter()
                    .map(|e| e.map_shared(f.clone()))
                    .collect(),
            ),
        }
    }
}

impl<A: fmt::Debug> fmt::Debug for Effect<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Send(action) => f.debug_tuple("Send").field(action).finish(),
            Self::Run(_) => f.write_str("Run(..)"),
            Self::Cancellable { id, mode, effect } => f
                .debug_struct("Cancellable")
                .field("id", id)
                .field("mode", mode)
                .field("effect", effect)
                .finish(),
            Self::Cancel(id) => f.debug_tuple("Cancel").field(id).finish(),
            Self::Merge(effects) => f.debug_tuple("Merge").field(effects).finish(),
        }
    }
}
