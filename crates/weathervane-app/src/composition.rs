//! Embedding an optional child state machine in a parent.
//!
//! The parent holds `Option<ChildState>`. Child actions arrive wrapped in
//! `PresentationAction` and are routed to the child's reducer only while a
//! child is mounted. All child work runs under the child's own scope, which
//! is cancelled when the child is dismissed or replaced.

use crate::runtime::{CancelId, Effect, Reducer};

#[derive(Debug, Clone, PartialEq)]
pub enum PresentationAction<A> {
    Presented(A),
    Dismiss,
}

/// Child state that owns a cancellation scope for its lifetime.
pub trait Presentable {
    fn scope(&self) -> CancelId;
}

/// Route a child action through `child`, lifting its effect into the parent.
pub fn reduce_presented<C, P, F>(
    child: &C,
    slot: &mut Option<C::State>,
    action: PresentationAction<C::Action>,
    embed: F,
) -> Effect<P>
where
    C: Reducer,
    C::State: Presentable,
    P: Send + 'static,
    F: Fn(C::Action) -> P + Send + Sync + 'static,
{
    match action {
        PresentationAction::Presented(child_action) => {
            let Some(state) = slot.as_mut() else {
                tracing::debug!("Ignoring {:?}: nothing presented", child_action);
                return Effect::none();
            };
            let scope = state.scope();
            child.reduce(state, child_action).map(embed).scoped(&scope)
        }
        PresentationAction::Dismiss => dismiss(slot),
    }
}

/// Mount `state`, cancelling the work of any child it replaces.
pub fn present<S: Presentable, P: Send + 'static>(slot: &mut Option<S>, state: S) -> Effect<P> {
    match slot.replace(state) {
        Some(previous) => Effect::cancel(previous.scope()),
        None => Effect::none(),
    }
}

/// Unmount the child and cancel its scope.
pub fn dismiss<S: Presentable, P: Send + 'static>(slot: &mut Option<S>) -> Effect<P> {
    match slot.take() {
        Some(previous) => Effect::cancel(previous.scope()),
        None => Effect::none(),
    }
}
