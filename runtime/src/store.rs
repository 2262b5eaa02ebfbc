//! Store runtime for coordinating reducer execution
//!
//! The store is the sole owner of state. Actions are queued and applied by a
//! single reducer task, one at a time, in the order they were dispatched.
//! After each step the new state is published on a watch channel, the action
//! is recorded in the history, and finally the action is fanned out on the
//! [`ActionBus`] (so a subscriber that sees an action can already read the
//! state it produced).

use crate::bus::{ActionBus, ActionStream};
use crate::history::{ActionLog, LoggedAction};
use crate::metrics::StoreMetrics;
use crate::selection::Selection;
use crate::{StoreConfig, StoreError};
use roster_core::{Action, Clock, Reducer, Selector, SystemClock};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot, watch};

/// Queued unit of work for the reducer task
enum Envelope<S, A> {
    /// Apply an action; optionally report the resulting state
    Apply {
        action: A,
        applied: Option<oneshot::Sender<Arc<S>>>,
    },
    /// Acknowledge once every earlier envelope has been processed
    Barrier(oneshot::Sender<()>),
}

struct Shared<S, A> {
    queue: mpsc::UnboundedSender<Envelope<S, A>>,
    state: watch::Receiver<Arc<S>>,
    bus: Arc<ActionBus<A>>,
    history: Arc<ActionLog<A>>,
    shutdown: AtomicBool,
    config: StoreConfig,
}

/// The Store - single authoritative state container
///
/// Cloning a `Store` is cheap; all clones share the same state and queue.
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
///
/// # Example
///
/// ```ignore
/// let store = Store::new(UserState::default(), UserReducer);
///
/// let next = store.send(UserAction::LoadUsers).await?;
/// assert!(next.loading);
/// ```
pub struct Store<S, A> {
    shared: Arc<Shared<S, A>>,
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S, A> Store<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    /// Create a store with default configuration and the system clock
    ///
    /// Must be called from within a Tokio runtime: the reducer task is
    /// spawned immediately.
    #[must_use]
    pub fn new<R>(initial_state: S, reducer: R) -> Self
    where
        R: Reducer<State = S, Action = A>,
    {
        Self::with_config(initial_state, reducer, StoreConfig::default())
    }

    /// Create a store with custom configuration
    #[must_use]
    pub fn with_config<R>(initial_state: S, reducer: R, config: StoreConfig) -> Self
    where
        R: Reducer<State = S, Action = A>,
    {
        Self::with_clock(initial_state, reducer, config, Arc::new(SystemClock))
    }

    /// Create a store with custom configuration and clock
    ///
    /// The clock timestamps history entries.
    #[must_use]
    pub fn with_clock<R>(
        initial_state: S,
        reducer: R,
        config: StoreConfig,
        clock: Arc<dyn Clock>,
    ) -> Self
    where
        R: Reducer<State = S, Action = A>,
    {
        let (queue, rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(Arc::new(initial_state));
        let bus = Arc::new(ActionBus::new());
        let history = Arc::new(ActionLog::new(config.history_limit, clock));

        tokio::spawn(run_reducer(
            reducer,
            rx,
            state_tx,
            Arc::clone(&bus),
            Arc::clone(&history),
        ));

        Self {
            shared: Arc::new(Shared {
                queue,
                state: state_rx,
                bus,
                history,
                shutdown: AtomicBool::new(false),
                config,
            }),
        }
    }

    /// Enqueue an action and return immediately
    ///
    /// The action is applied after every previously dispatched action.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once shutdown has started.
    #[tracing::instrument(skip(self, action), fields(action = action.action_type()), name = "store_dispatch")]
    pub fn dispatch(&self, action: A) -> Result<(), StoreError> {
        self.enqueue(action, None)
    }

    /// Enqueue an action and wait until it has been applied
    ///
    /// Resolves with the state produced by this action (later actions may
    /// already be queued behind it).
    ///
    /// # Errors
    ///
    /// - [`StoreError::ShutdownInProgress`]: shutdown has started
    /// - [`StoreError::ChannelClosed`]: the reducer task is gone
    #[tracing::instrument(skip(self, action), fields(action = action.action_type()), name = "store_send")]
    pub async fn send(&self, action: A) -> Result<Arc<S>, StoreError> {
        let (tx, rx) = oneshot::channel();
        self.enqueue(action, Some(tx))?;
        rx.await.map_err(|_| StoreError::ChannelClosed)
    }

    /// Send an action and wait for a matching follow-up action
    ///
    /// Subscribes to the action bus BEFORE dispatching, so a follow-up can't
    /// slip past. The predicate sees every action applied after the
    /// subscription, including `action` itself.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`]: no matching action within `timeout`
    /// - [`StoreError::ChannelClosed`]: the bus closed while waiting
    /// - [`StoreError::ShutdownInProgress`]: shutdown has started
    ///
    /// # Example
    ///
    /// ```ignore
    /// let outcome = store
    ///     .send_and_wait_for(UserAction::LoadUsers, Action::is_terminal, Duration::from_secs(5))
    ///     .await?;
    /// ```
    pub async fn send_and_wait_for<F>(
        &self,
        action: A,
        predicate: F,
        timeout: Duration,
    ) -> Result<A, StoreError>
    where
        F: Fn(&A) -> bool,
    {
        let mut actions = self.subscribe_actions();
        self.dispatch(action)?;

        tokio::time::timeout(timeout, async {
            while let Some(action) = actions.recv().await {
                if predicate(&action) {
                    return Ok(action);
                }
            }
            Err(StoreError::ChannelClosed)
        })
        .await
        .map_err(|_| StoreError::Timeout)?
    }

    /// Current state snapshot
    #[must_use]
    pub fn snapshot(&self) -> Arc<S> {
        Arc::clone(&self.shared.state.borrow())
    }

    /// Read current state via a closure
    ///
    /// ```ignore
    /// let count = store.state(|s| s.users.len());
    /// ```
    pub fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        f(&self.shared.state.borrow())
    }

    /// Receiver that is notified whenever the state value changes
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<Arc<S>> {
        self.shared.state.clone()
    }

    /// Observe a selector over this store's state
    ///
    /// The selection starts with the current output and only reports
    /// changes to that output.
    #[must_use]
    pub fn select<Sel>(&self, selector: Sel) -> Selection<S, Sel>
    where
        Sel: Selector<S> + 'static,
        Sel::Output: PartialEq + Send,
    {
        Selection::new(selector, self.watch_state())
    }

    /// Subscribe to every action applied from now on
    #[must_use]
    pub fn subscribe_actions(&self) -> ActionStream<A> {
        self.shared.bus.subscribe()
    }

    /// Recently applied actions, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<LoggedAction<A>> {
        self.shared.history.entries()
    }

    /// The store's configuration
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.shared.config
    }

    /// Returns true once shutdown has started
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.shared.shutdown.load(Ordering::Acquire)
    }

    /// Stop accepting actions, apply what is already queued, close the bus
    ///
    /// Idempotent: a second call returns immediately.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ChannelClosed`] if the reducer task is gone.
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        if self.shared.shutdown.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        tracing::info!("Initiating store shutdown");

        let (tx, rx) = oneshot::channel();
        let drained = self
            .shared
            .queue
            .send(Envelope::Barrier(tx))
            .map_err(|_| StoreError::ChannelClosed);
        let drained = match drained {
            Ok(()) => rx.await.map_err(|_| StoreError::ChannelClosed),
            Err(e) => Err(e),
        };

        self.shared.bus.close();
        tracing::info!("Store shutdown complete");
        drained
    }

    fn enqueue(&self, action: A, applied: Option<oneshot::Sender<Arc<S>>>) -> Result<(), StoreError> {
        if self.is_shutting_down() {
            tracing::warn!(action = action.action_type(), "Rejected action: store is shutting down");
            StoreMetrics::record_rejection();
            return Err(StoreError::ShutdownInProgress);
        }

        StoreMetrics::record_action();
        self.shared
            .queue
            .send(Envelope::Apply { action, applied })
            .map_err(|_| StoreError::ChannelClosed)
    }
}

impl<S, A> std::fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("shutdown", &self.shared.shutdown.load(Ordering::Relaxed))
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}

/// The reducer task: the only code path that replaces the state value
async fn run_reducer<R>(
    reducer: R,
    mut queue: mpsc::UnboundedReceiver<Envelope<R::State, R::Action>>,
    state: watch::Sender<Arc<R::State>>,
    bus: Arc<ActionBus<R::Action>>,
    history: Arc<ActionLog<R::Action>>,
) where
    R: Reducer,
    R::Action: Action,
{
    while let Some(envelope) = queue.recv().await {
        let (action, applied) = match envelope {
            Envelope::Apply { action, applied } => (action, applied),
            Envelope::Barrier(ack) => {
                let _ = ack.send(());
                continue;
            },
        };

        let current = Arc::clone(&state.borrow());

        let span = tracing::debug_span!("reducer_execution", action = action.action_type());
        let next = {
            let _enter = span.enter();
            let start = Instant::now();
            let next = reducer.reduce(&current, &action);
            let changed = !Arc::ptr_eq(&current, &next);
            StoreMetrics::record_reduce(start.elapsed(), changed);
            tracing::trace!(changed, "Reducer completed");
            next
        };

        if !Arc::ptr_eq(&current, &next) {
            state.send_replace(Arc::clone(&next));
        }

        let seq = history.record(&action);
        tracing::debug!(seq, action = action.action_type(), "Action applied");

        bus.publish(&action);

        if let Some(applied) = applied {
            let _ = applied.send(next);
        }
    }

    tracing::debug!("Reducer task finished");
}
