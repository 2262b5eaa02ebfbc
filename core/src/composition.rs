//! Reducer composition
//!
//! [`scope_reducer`] lifts a feature reducer into a larger state and action
//! type. It preserves state identity: when the feature reducer changes
//! nothing, or the action belongs to another feature, the caller gets back
//! the very same `Arc` it passed in.
//!
//! # Example
//!
//! ```
//! use roster_core::Reducer;
//! use roster_core::composition::scope_reducer;
//! use std::sync::Arc;
//!
//! #[derive(Clone, Default)]
//! struct CounterState {
//!     count: i32,
//! }
//!
//! #[derive(Clone)]
//! enum CounterAction {
//!     Increment,
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!
//!     fn reduce(&self, state: &Arc<CounterState>, action: &CounterAction) -> Arc<CounterState> {
//!         match action {
//!             CounterAction::Increment => Arc::new(CounterState { count: state.count + 1 }),
//!         }
//!     }
//! }
//!
//! #[derive(Clone, Default)]
//! struct AppState {
//!     counter: Arc<CounterState>,
//!     title: String,
//! }
//!
//! #[derive(Clone)]
//! enum AppAction {
//!     Counter(CounterAction),
//!     Rename(String),
//! }
//!
//! let scoped = scope_reducer(
//!     CounterReducer,
//!     |app: &AppState| &app.counter,
//!     |app: &AppState, counter| AppState { counter, ..app.clone() },
//!     |action: &AppAction| match action {
//!         AppAction::Counter(inner) => Some(inner),
//!         AppAction::Rename(_) => None,
//!     },
//! );
//!
//! let state = Arc::new(AppState::default());
//! let next = scoped.reduce(&state, &AppAction::Counter(CounterAction::Increment));
//! assert_eq!(next.counter.count, 1);
//!
//! // Actions outside the feature leave the state untouched
//! let same = scoped.reduce(&next, &AppAction::Rename("x".into()));
//! assert!(Arc::ptr_eq(&next, &same));
//! ```

use crate::reducer::Reducer;
use std::sync::Arc;

/// Scopes a reducer to operate on a subset of a larger state.
///
/// # Arguments
///
/// - `reducer`: The feature reducer
/// - `get_state`: Reads the feature's slice out of the parent state
/// - `set_state`: Builds a new parent state holding an updated slice
/// - `extract_action`: Returns the feature action, or `None` for actions the
///   feature does not handle
#[must_use]
pub fn scope_reducer<S, SubS, A, SubA, R>(
    reducer: R,
    get_state: fn(&S) -> &Arc<SubS>,
    set_state: fn(&S, Arc<SubS>) -> S,
    extract_action: fn(&A) -> Option<&SubA>,
) -> ScopedReducer<S, SubS, A, SubA, R>
where
    S: Send + Sync + 'static,
    SubS: Send + Sync + 'static,
    R: Reducer<State = SubS, Action = SubA>,
{
    ScopedReducer {
        reducer,
        get_state,
        set_state,
        extract_action,
    }
}

/// A scoped reducer that operates on a subset of state.
///
/// Created by [`scope_reducer`].
pub struct ScopedReducer<S, SubS, A, SubA, R>
where
    R: Reducer<State = SubS, Action = SubA>,
{
    reducer: R,
    get_state: fn(&S) -> &Arc<SubS>,
    set_state: fn(&S, Arc<SubS>) -> S,
    extract_action: fn(&A) -> Option<&SubA>,
}

impl<S, SubS, A, SubA, R> Reducer for ScopedReducer<S, SubS, A, SubA, R>
where
    S: Send + Sync + 'static,
    SubS: Send + Sync + 'static,
    A: 'static,
    SubA: 'static,
    R: Reducer<State = SubS, Action = SubA>,
{
    type State = S;
    type Action = A;

    fn reduce(&self, state: &Arc<S>, action: &A) -> Arc<S> {
        let Some(sub_action) = (self.extract_action)(action) else {
            return Arc::clone(state);
        };

        let sub_state = (self.get_state)(state);
        let next_sub = self.reducer.reduce(sub_state, sub_action);

        if Arc::ptr_eq(sub_state, &next_sub) {
            Arc::clone(state)
        } else {
            Arc::new((self.set_state)(state, next_sub))
        }
    }
}
