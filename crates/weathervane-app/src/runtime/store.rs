//! The store: one serialized action queue per state machine.
//!
//! `Store::new` spawns a worker task that owns the state and the reducer.
//! Actions are reduced strictly one at a time; effects run concurrently on
//! the tokio runtime and post their actions back onto the same queue.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;

use super::cancel::{CancelRegistry, Ticket};
use super::effect::{Effect, Emitter};

/// A pure state transition plus a description of follow-up work.
pub trait Reducer: Send + 'static {
    type State: Clone + Send + Sync + 'static;
    type Action: Clone + fmt::Debug + Send + Sync + 'static;

    fn reduce(&self, state: &mut Self::State, action: Self::Action) -> Effect<Self::Action>;
}

/// One reduced action and the state it produced.
#[derive(Debug, Clone)]
pub struct Transition<S, A> {
    pub action: A,
    pub state: S,
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("Store has shut down")]
    Closed,
}

enum Envelope<A> {
    Action { action: A, tickets: Vec<Ticket> },
    Finished(Vec<Ticket>),
}

const TRANSITION_CAPACITY: usize = 256;

/// Cloneable handle for enqueueing actions from outside the store.
pub struct Dispatcher<A> {
    tx: mpsc::UnboundedSender<Envelope<A>>,
}

impl<A> Clone for Dispatcher<A> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<A: fmt::Debug> Dispatcher<A> {
    pub fn send(&self, action: A) {
        if let Err(mpsc::error::SendError(Envelope::Action { action, .. })) =
            self.tx.send(Envelope::Action {
                action,
                tickets: Vec::new(),
            })
        {
            tracing::warn!("Dropping {:?}: store has shut down", action);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub struct Store<R: Reducer> {
    dispatcher: Dispatcher<R::Action>,
    snapshot: watch::Receiver<R::State>,
    transitions: broadcast::Sender<Arc<Transition<R::State, R::Action>>>,
    shutdown: CancellationToken,
}

impl<R: Reducer> Store<R> {
    /// Start a store. Must be called from within a tokio runtime.
    pub fn new(reducer: R, initial: R::State) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot) = watch::channel(initial.clone());
        let (transitions, _) = broadcast::channel(TRANSITION_CAPACITY);
        let shutdown = CancellationToken::new();

        let worker = Worker {
            reducer,
            state: initial,
            registry: CancelRegistry::new(),
            tx: tx.clone(),
            rx,
            snapshot: snapshot_tx,
            transitions: transitions.clone(),
            shutdown: shutdown.clone(),
        };
        tokio::spawn(worker.run());

        Self {
            dispatcher: Dispatcher { tx },
            snapshot,
            transitions,
            shutdown,
        }
    }

    /// Enqueue an action.
    pub fn send(&self, action: R::Action) {
        self.dispatcher.send(action)
    }

    /// The most recently published state.
    pub fn state(&self) -> R::State {
        self.snapshot.borrow().clone()
    }

    /// Receiver of published states; a change fires once per queue step.
    pub fn subscribe(&self) -> watch::Receiver<R::State> {
        self.snapshot.clone()
    }

    /// Every reduced action with the state it produced, in order.
    pub fn transitions(&self) -> broadcast::Receiver<Arc<Transition<R::State, R::Action>>> {
        self.transitions.subscribe()
    }

    pub fn dispatcher(&self) -> Dispatcher<R::Action> {
        self.dispatcher.clone()
    }

    /// Wait until a published state satisfies `predicate`.
    pub async fn wait_for<F>(&self, mut predicate: F) -> Result<R::State, RuntimeError>
    where
        F: FnMut(&R::State) -> bool,
    {
        let mut rx = self.snapshot.clone();
        let state = rx
            .wait_for(|state| predicate(state))
            .await
            .map_err(|_| RuntimeError::Closed)?;
        Ok(state.clone())
    }

    /// Stop the worker and cancel every in-flight effect.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl<R: Reducer> Drop for Store<R> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

struct Worker<R: Reducer> {
    reducer: R,
    state: R::State,
    registry: CancelRegistry,
    tx: mpsc::UnboundedSender<Envelope<R::Action>>,
    rx: mpsc::UnboundedReceiver<Envelope<R::Action>>,
    snapshot: watch::Sender<R::State>,
    transitions: broadcast::Sender<Arc<Transition<R::State, R::Action>>>,
    shutdown: CancellationToken,
}

impl<R: Reducer> Worker<R> {
    async fn run(mut self) {
        tracing::debug!("Store worker started");

        loop {
            let envelope = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                envelope = self.rx.recv() => match envelope {
                    Some(envelope) => envelope,
                    None => break,
                },
            };

            match envelope {
                Envelope::Action { action, tickets } => {
                    if self.registry.is_live(&tickets) {
                        self.step(action);
                    } else {
                        tracing::debug!("Dropping {:?}: its effect was cancelled", action);
                    }
                }
                Envelope::Finished(tickets) => self.registry.finish(&tickets),
            }
        }

        tracing::debug!("Store worker stopped");
    }

    /// Reduce `action` and every synchronous follow-up, then publish once.
    fn step(&mut self, action: R::Action) {
        let root = self.shutdown.clone();
        let mut pending = VecDeque::from([action]);

        while let Some(action) = pending.pop_front() {
            tracing::debug!("Reducing {:?}", action);
            let effect = self.reducer.reduce(&mut self.state, action.clone());
            let _ = self.transitions.send(Arc::new(Transition {
                action,
                state: self.state.clone(),
            }));
            self.execute(effect, &[], &root, &mut pending);
        }

        self.snapshot.send_replace(self.state.clone());
    }

    fn execute(
        &mut self,
        effect: Effect<R::Action>,
        tickets: &[Ticket],
        parent: &CancellationToken,
        pending: &mut VecDeque<R::Action>,
    ) {
        match effect {
            Effect::None => {}
            Effect::Send(action) => pending.push_back(action),
            Effect::Merge(effects) => {
                for effect in effects {
                    self.execute(effect, tickets, parent, pending);
                }
            }
            Effect::Cancel(id) => self.registry.cancel(&id),
            Effect::Cancellable { id, mode, effect } => {
                let (ticket, token) = self.registry.enter(id, mode, parent);
                let mut scoped = tickets.to_vec();
                scoped.push(ticket.clone());
                self.execute(*effect, &scoped, &token, pending);
                self.registry.release_if_idle(&ticket);
            }
            Effect::Run(work) => {
                self.registry.retain(tickets);
                self.spawn(work, tickets.to_vec(), parent.clone());
            }
        }
    }

    fn spawn(
        &self,
        work: Box<dyn FnOnce(Emitter<R::Action>) -> futures::future::BoxFuture<'static, ()> + Send>,
        tickets: Vec<Ticket>,
        token: CancellationToken,
    ) {
        let sink = self.tx.clone();
        let emit_tickets = tickets.clone();
        let emitter = Emitter::new(move |action| {
            let _ = sink.send(Envelope::Action {
                action,
                tickets: emit_tickets.clone(),
            });
        });

        let done = self.tx.clone();
        let future = work(emitter);
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = future => {}
            }
            let _ = done.send(Envelope::Finished(tickets));
        });
    }
}
