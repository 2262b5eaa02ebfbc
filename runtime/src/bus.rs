//! Lossless multi-consumer action fan-out
//!
//! Every subscriber owns an unbounded queue, so a slow consumer never causes
//! another consumer (or itself) to miss an action. The store publishes each
//! action after the state it produced is visible, in application order.

use futures::Stream;
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;

#[derive(Debug)]
struct BusState<A> {
    subscribers: Vec<mpsc::UnboundedSender<A>>,
    closed: bool,
}

/// Fan-out channel for applied actions
#[derive(Debug)]
pub struct ActionBus<A> {
    state: Mutex<BusState<A>>,
}

impl<A: Clone + Send + 'static> ActionBus<A> {
    /// Create an open bus with no subscribers
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(BusState {
                subscribers: Vec::new(),
                closed: false,
            }),
        }
    }

    /// Subscribe to every action published from now on
    ///
    /// Subscribing to a closed bus yields a stream that is already finished.
    #[must_use]
    pub fn subscribe(&self) -> ActionStream<A> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.lock();
        // Checked under the lock so a concurrent close() cannot miss this sender
        if !state.closed {
            state.subscribers.push(tx);
        }
        ActionStream { rx }
    }

    /// Deliver `action` to every live subscriber
    ///
    /// Subscribers whose stream was dropped are pruned. Returns the number of
    /// subscribers that received the action.
    pub fn publish(&self, action: &A) -> usize {
        let mut state = self.lock();
        state.subscribers.retain(|tx| tx.send(action.clone()).is_ok());
        state.subscribers.len()
    }

    /// Close the bus: existing streams end after draining, new ones start closed
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.subscribers.clear();
    }

    /// Returns true once [`close`](Self::close) has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of live subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let mut state = self.lock();
        state.subscribers.retain(|tx| !tx.is_closed());
        state.subscribers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BusState<A>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A: Clone + Send + 'static> Default for ActionBus<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// One subscriber's view of the bus
#[derive(Debug)]
pub struct ActionStream<A> {
    rx: mpsc::UnboundedReceiver<A>,
}

impl<A: Send + 'static> ActionStream<A> {
    /// Wait for the next action
    ///
    /// Returns `None` once the bus is closed and every queued action has
    /// been received.
    pub async fn recv(&mut self) -> Option<A> {
        self.rx.recv().await
    }

    /// Take the next queued action without waiting
    pub fn try_recv(&mut self) -> Option<A> {
        self.rx.try_recv().ok()
    }

    /// Convert into a `futures::Stream`
    pub fn into_stream(mut self) -> impl Stream<Item = A> + Send {
        async_stream::stream! {
            while let Some(action) = self.rx.recv().await {
                yield action;
            }
        }
    }
}
