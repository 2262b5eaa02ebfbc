//! # Roster Core
//!
//! Core traits and types for the Roster state container.
//!
//! This crate provides the fundamental abstractions for keeping a single,
//! authoritative in-memory state consistent while asynchronous requests
//! against a remote service are in flight.
//!
//! ## Core Concepts
//!
//! - **Action**: Immutable typed message describing an intent or an outcome
//! - **Reducer**: Pure function `(State, Action) → State`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Effects**: Maps observed actions onto effect descriptions (the orchestrator's logic)
//! - **Environment**: Injected dependencies via traits (`Clock`, `HttpClient`)
//! - **Selector**: Pure, memoized read projection of state
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell
//! - Unidirectional Data Flow
//! - Explicit Effects (no hidden I/O)
//! - Dependency Injection via constructor parameters
//!
//! ## Example
//!
//! ```ignore
//! use roster_core::*;
//!
//! #[derive(Clone, Debug, Default)]
//! struct CounterState {
//!     count: i64,
//! }
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
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

/// Reducer composition (scoping a feature reducer into a larger state)
pub mod composition;

/// Declarative macros for effect construction
pub mod effect_macros;

/// Memoized selectors
pub mod selector;

pub use action::Action;
pub use effect::{Effect, Effects};
pub use environment::{Clock, HttpClient, RequestError, SystemClock};
pub use reducer::Reducer;
pub use selector::{Identity, Memoized, Selector, create_selector};

/// Action module - the closed vocabulary of state transitions
///
/// Actions are the only vehicle for state change. Each feature defines one
/// action enum, usually deriving this trait with `roster_macros::Action`
/// and marking variants as `#[request]`, `#[success]` or `#[failure]`.
pub mod action {
    /// Classification shared by every action enum
    ///
    /// The runtime uses this to log actions and to tell request actions
    /// (which start asynchronous work) from terminal ones (which end it).
    pub trait Action: Clone + Send + Sync + 'static {
        /// Stable name of the variant, used in logs and history
        fn action_type(&self) -> &'static str;

        /// Returns true if this action starts an asynchronous request
        fn is_request(&self) -> bool;

        /// Returns true if this action reports a successful request
        fn is_success(&self) -> bool;

        /// Returns true if this action reports a failed request
        fn is_failure(&self) -> bool;

        /// Returns true if this action ends a request (success or failure)
        fn is_terminal(&self) -> bool {
            self.is_success() || self.is_failure()
        }
    }
}

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action) → State`
///
/// They contain all state transition logic and are deterministic and testable.
pub mod reducer {
    use std::sync::Arc;

    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    ///
    /// # Contract
    ///
    /// - Never mutate the input state; build a new value instead
    /// - Return `Arc::clone(state)` when nothing changes, so observers can
    ///   detect "no change" with [`Arc::ptr_eq`]
    /// - Never panic; actions referring to absent entities are no-ops
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for OrderReducer {
    ///     type State = OrderState;
    ///     type Action = OrderAction;
    ///
    ///     fn reduce(&self, state: &Arc<OrderState>, action: &OrderAction) -> Arc<OrderState> {
    ///         match action {
    ///             OrderAction::Placed { order } => {
    ///                 let mut next = OrderState::clone(state);
    ///                 next.orders.push(order.clone());
    ///                 Arc::new(next)
    ///             }
    ///             _ => Arc::clone(state),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer: Send + Sync + 'static {
        /// The state type this reducer operates on
        type State: Send + Sync + 'static;

        /// The action type this reducer processes
        type Action;

        /// Compute the next state for `action`
        ///
        /// # Arguments
        ///
        /// - `state`: Shared reference to the current state
        /// - `action`: The action to apply
        ///
        /// # Returns
        ///
        /// The next state, or the same `Arc` when the action changes nothing
        fn reduce(&self, state: &Arc<Self::State>, action: &Self::Action) -> Arc<Self::State>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable.
pub mod effect {
    use smallvec::SmallVec;
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from [`Effects::handle`] and executed by the effect orchestrator.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects concurrently
        Parallel(Vec<Effect<Action>>),

        /// Run effects one after another
        Sequential(Vec<Effect<Action>>),

        /// Delayed action
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is dispatched back into the store
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Returns true if this effect does nothing
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }

    /// Effect logic for a feature: which side effects an applied action triggers
    ///
    /// The runtime's orchestrator calls [`Effects::handle`] once for every
    /// action applied by the store, after the reducer has run. Each returned
    /// effect is executed independently; actions it yields are dispatched
    /// back into the store.
    ///
    /// Implementations receive their dependencies (HTTP client, configuration)
    /// at construction time.
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Effects for OrderEffects {
    ///     type Action = OrderAction;
    ///
    ///     fn handle(&self, action: &OrderAction) -> SmallVec<[Effect<OrderAction>; 4]> {
    ///         match action {
    ///             OrderAction::Load => smallvec![self.load()],
    ///             _ => SmallVec::new(),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Effects: Send + Sync + 'static {
        /// The action type observed and produced
        type Action;

        /// Describe the effects triggered by `action`
        fn handle(&self, action: &Self::Action) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and handed to the
/// components that need them at construction time.
pub mod environment {
    use chrono::{DateTime, Utc};
    use serde_json::Value;
    use std::future::Future;
    use thiserror::Error;

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Production - uses system clock
    /// let clock = SystemClock;
    ///
    /// // Test - fixed time for deterministic tests
    /// let clock = roster_testing::test_clock();
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Errors produced by an [`HttpClient`]
    ///
    /// The `Display` text is what ends up in failure actions, so it is kept
    /// human readable.
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum RequestError {
        /// The request never produced a response (network error, timeout)
        #[error("{0}")]
        Transport(String),

        /// The service answered with a non-success status
        #[error("request to {url} failed with status {status}")]
        Status {
            /// Requested URL
            url: String,
            /// HTTP status code
            status: u16,
        },

        /// The response body could not be read as JSON
        #[error("invalid response body: {0}")]
        Decode(String),
    }

    /// Abstract request capability against a remote JSON service
    ///
    /// Transport-agnostic: production uses a `reqwest` client, tests use a
    /// scripted mock. Payloads are JSON values; typed decoding happens in the
    /// feature's service layer.
    pub trait HttpClient: Send + Sync + 'static {
        /// `GET url`
        ///
        /// # Errors
        ///
        /// Returns [`RequestError`] if the request fails or the body is not JSON.
        fn get(&self, url: &str) -> impl Future<Output = Result<Value, RequestError>> + Send;

        /// `POST url` with a JSON body
        ///
        /// # Errors
        ///
        /// Returns [`RequestError`] if the request fails or the body is not JSON.
        fn post(
            &self,
            url: &str,
            body: Value,
        ) -> impl Future<Output = Result<Value, RequestError>> + Send;

        /// `PUT url` with a JSON body
        ///
        /// # Errors
        ///
        /// Returns [`RequestError`] if the request fails or the body is not JSON.
        fn put(
            &self,
            url: &str,
            body: Value,
        ) -> impl Future<Output = Result<Value, RequestError>> + Send;

        /// `DELETE url`
        ///
        /// # Errors
        ///
        /// Returns [`RequestError`] if the request fails.
        fn delete(&self, url: &str) -> impl Future<Output = Result<(), RequestError>> + Send;
    }
}
