//! Bounded history of applied actions
//!
//! A FIFO of the most recent actions the store applied, each stamped with a
//! sequence number and the time it was applied. Oldest entries are evicted
//! once the limit is reached.

use chrono::{DateTime, Utc};
use roster_core::{Action, Clock};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// One applied action
#[derive(Debug, Clone)]
pub struct LoggedAction<A> {
    /// Position in application order, starting at 1
    pub seq: u64,
    /// `Action::action_type` of the action
    pub action_type: &'static str,
    /// When the action was applied
    pub applied_at: DateTime<Utc>,
    /// The action itself
    pub action: A,
}

struct LogState<A> {
    entries: VecDeque<LoggedAction<A>>,
    next_seq: u64,
}

/// Bounded, thread-safe action history
pub struct ActionLog<A> {
    state: Mutex<LogState<A>>,
    limit: usize,
    clock: Arc<dyn Clock>,
}

impl<A: Action> ActionLog<A> {
    /// Create a log keeping at most `limit` entries (0 keeps nothing)
    ///
    /// Storage grows with the entries actually recorded.
    #[must_use]
    pub fn new(limit: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(LogState {
                entries: VecDeque::new(),
                next_seq: 1,
            }),
            limit,
            clock,
        }
    }

    /// Append `action`, evicting the oldest entry if the log is full
    ///
    /// Sequence numbers keep advancing even when the log is disabled.
    pub fn record(&self, action: &A) -> u64 {
        let mut state = self.lock();
        let seq = state.next_seq;
        state.next_seq += 1;

        if self.limit == 0 {
            return seq;
        }
        if state.entries.len() == self.limit {
            state.entries.pop_front();
        }
        state.entries.push_back(LoggedAction {
            seq,
            action_type: action.action_type(),
            applied_at: self.clock.now(),
            action: action.clone(),
        });
        seq
    }

    /// Copy of the retained entries, oldest first
    #[must_use]
    pub fn entries(&self) -> Vec<LoggedAction<A>> {
        self.lock().entries.iter().cloned().collect()
    }

    /// Number of retained entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns true if nothing is retained
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Maximum number of retained entries
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LogState<A>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A> std::fmt::Debug for ActionLog<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionLog")
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}
