//! Effect orchestration
//!
//! The [`EffectOrchestrator`] subscribes to a store's action bus, asks the
//! feature's [`Effects`] what each applied action should trigger, and runs
//! every returned effect in its own task. Actions produced by effects are
//! sent back into the store.
//!
//! Effects are never serialized, debounced or cancelled against each other:
//! two request actions of the same kind produce two independent tasks, and
//! their follow-up actions are applied in whatever order they complete.

use crate::StoreError;
use crate::bus::ActionStream;
use crate::metrics::OrchestratorMetrics;
use crate::store::Store;
use futures::future::{BoxFuture, FutureExt, join_all};
use roster_core::{Action, Effect, Effects};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Count of effects in flight, observable by waiters
#[derive(Clone)]
struct PendingEffects(Arc<watch::Sender<usize>>);

impl PendingEffects {
    fn new() -> Self {
        Self(Arc::new(watch::channel(0).0))
    }

    fn get(&self) -> usize {
        *self.0.borrow()
    }

    /// Increment and return a guard that decrements on drop
    fn track(&self) -> PendingGuard {
        self.0.send_modify(|n| *n += 1);
        OrchestratorMetrics::record_pending(self.get());
        PendingGuard(self.clone())
    }
}

/// RAII guard that decrements the pending count on drop
///
/// Ensures the count is always decremented, even if the effect panics.
struct PendingGuard(PendingEffects);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.0.send_modify(|n| *n = n.saturating_sub(1));
        OrchestratorMetrics::record_pending(self.0.get());
    }
}

/// Runs the effects triggered by a store's actions
///
/// # Example
///
/// ```ignore
/// let store = Store::new(UserState::default(), UserReducer);
/// let orchestrator = EffectOrchestrator::spawn(&store, UserEffects::new(api, IdStrategy::default()));
///
/// store.dispatch(UserAction::LoadUsers)?;
///
/// orchestrator.shutdown(Duration::from_secs(5)).await?;
/// store.shutdown().await?;
/// ```
pub struct EffectOrchestrator {
    listener: JoinHandle<()>,
    pending: PendingEffects,
    stopping: Arc<AtomicBool>,
}

impl EffectOrchestrator {
    /// Subscribe to `store` and start handling its actions
    ///
    /// The subscription is taken before this returns, so every action
    /// dispatched afterwards is observed.
    #[must_use]
    pub fn spawn<S, E>(store: &Store<S, E::Action>, effects: E) -> Self
    where
        S: Send + Sync + 'static,
        E: Effects,
        E::Action: Action,
    {
        let actions = store.subscribe_actions();
        let pending = PendingEffects::new();
        let stopping = Arc::new(AtomicBool::new(false));

        let listener = tokio::spawn(listen(
            actions,
            store.clone(),
            effects,
            pending.clone(),
            Arc::clone(&stopping),
        ));

        Self {
            listener,
            pending,
            stopping,
        }
    }

    /// Number of effects currently in flight
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.get()
    }

    /// Wait until no effect is in flight
    pub async fn wait_idle(&self) {
        let mut rx = self.pending.0.subscribe();
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    /// Stop handling new actions and wait for in-flight effects
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] with the number of effects
    /// still running if `timeout` elapses first.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        tracing::info!("Initiating orchestrator shutdown");
        self.stopping.store(true, Ordering::Release);

        let result = tokio::time::timeout(timeout, self.wait_idle()).await;
        self.listener.abort();

        match result {
            Ok(()) => {
                tracing::info!("All effects completed, shutdown successful");
                Ok(())
            },
            Err(_) => {
                let pending = self.pending();
                tracing::error!(pending_effects = pending, "Shutdown timeout: {} effects still running", pending);
                Err(StoreError::ShutdownTimeout(pending))
            },
        }
    }
}

impl Drop for EffectOrchestrator {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

impl std::fmt::Debug for EffectOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectOrchestrator")
            .field("pending", &self.pending())
            .field("stopping", &self.stopping.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

async fn listen<S, E>(
    mut actions: ActionStream<E::Action>,
    store: Store<S, E::Action>,
    effects: E,
    pending: PendingEffects,
    stopping: Arc<AtomicBool>,
) where
    S: Send + Sync + 'static,
    E: Effects,
    E::Action: Action,
{
    while let Some(action) = actions.recv().await {
        if stopping.load(Ordering::Acquire) {
            tracing::debug!(action = action.action_type(), "Orchestrator stopping, action ignored");
            continue;
        }

        for effect in effects.handle(&action) {
            if effect.is_none() {
                OrchestratorMetrics::record_effect("none");
                continue;
            }

            let guard = pending.track();
            let store = store.clone();
            let span = tracing::debug_span!("effect", trigger = action.action_type());

            tokio::spawn(
                async move {
                    let _guard = guard;
                    run_effect(effect, store).await;
                }
                .instrument(span),
            );
        }
    }

    tracing::debug!("Action stream closed, orchestrator finished");
}

/// Execute one effect description to completion
///
/// - `None`: No-op
/// - `Future`: Awaits the computation, sends the resulting action if `Some`
/// - `Delay`: Waits for the duration, then sends the action
/// - `Parallel`: Runs the effects concurrently and waits for all of them
/// - `Sequential`: Runs the effects in order, each after the previous finished
fn run_effect<S, A>(effect: Effect<A>, store: Store<S, A>) -> BoxFuture<'static, ()>
where
    S: Send + Sync + 'static,
    A: Action,
{
    async move {
        match effect {
            Effect::None => {
                tracing::trace!("Executing Effect::None (no-op)");
                OrchestratorMetrics::record_effect("none");
            },
            Effect::Future(fut) => {
                tracing::trace!("Executing Effect::Future");
                OrchestratorMetrics::record_effect("future");
                if let Some(action) = fut.await {
                    feed_back(&store, action).await;
                } else {
                    tracing::trace!("Effect::Future completed with no action");
                }
            },
            Effect::Delay { duration, action } => {
                tracing::trace!("Executing Effect::Delay (duration: {:?})", duration);
                OrchestratorMetrics::record_effect("delay");
                tokio::time::sleep(duration).await;
                feed_back(&store, *action).await;
            },
            Effect::Parallel(effects) => {
                tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                OrchestratorMetrics::record_effect("parallel");
                join_all(effects.into_iter().map(|effect| run_effect(effect, store.clone()))).await;
            },
            Effect::Sequential(effects) => {
                tracing::trace!("Executing Effect::Sequential with {} effects", effects.len());
                OrchestratorMetrics::record_effect("sequential");
                for effect in effects {
                    run_effect(effect, store.clone()).await;
                }
            },
        }
    }
    .boxed()
}

async fn feed_back<S, A>(store: &Store<S, A>, action: A)
where
    S: Send + Sync + 'static,
    A: Action,
{
    tracing::trace!(action = action.action_type(), "Effect produced an action, sending to store");
    if let Err(error) = store.send(action).await {
        tracing::warn!(%error, "Follow-up action was not applied");
    }
}
