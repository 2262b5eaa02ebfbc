//! # Roster Runtime
//!
//! Runtime implementation for the Roster state container.
//!
//! This crate provides the [`Store`] that owns state and applies the reducer,
//! and the [`EffectOrchestrator`] that turns applied actions into asynchronous
//! work and feeds the resulting actions back.
//!
//! ## Core Components
//!
//! - **Store**: Sole owner of state; applies one action at a time, in dispatch order
//! - **Action Bus**: Lossless fan-out of every applied action to subscribers
//! - **Effect Orchestrator**: Executes effect descriptions and dispatches follow-up actions
//! - **Selection**: Observable, memoized view of state
//! - **Action Log**: Bounded history of applied actions
//!
//! ## Example
//!
//! ```ignore
//! use roster_runtime::{EffectOrchestrator, Store};
//!
//! let store = Store::new(UserState::default(), UserReducer);
//! let orchestrator = EffectOrchestrator::spawn(&store, UserEffects::new(api, config));
//!
//! // Enqueue an action
//! store.dispatch(UserAction::LoadUsers)?;
//!
//! // Read state
//! let loading = store.state(|s| s.loading);
//! ```

use std::time::Duration;

/// Lossless action fan-out
pub mod bus;

/// Bounded action history
pub mod history;

/// `reqwest`-backed request capability
pub mod http;

/// Metrics for observability
pub mod metrics;

/// Effect execution
pub mod orchestrator;

/// Observable selections
pub mod selection;

/// The store
pub mod store;

pub use bus::{ActionBus, ActionStream};
pub use error::StoreError;
pub use history::{ActionLog, LoggedAction};
pub use http::ReqwestClient;
pub use orchestrator::EffectOrchestrator;
pub use selection::Selection;
pub use store::Store;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// Returned by `dispatch()`/`send()` once shutdown has started.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for a matching action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before
        /// a matching action is applied.
        #[error("Timeout waiting for action")]
        Timeout,

        /// The store's reducer loop or action bus is gone
        #[error("Store channel closed")]
        ChannelClosed,
    }
}

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use roster_runtime::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::default()
///     .with_history_limit(50)
///     .with_shutdown_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.history_limit, 50);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum number of applied actions kept in the history (0 disables it)
    pub history_limit: usize,
    /// Default timeout for graceful shutdown
    pub default_shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(history_limit: usize, default_shutdown_timeout: Duration) -> Self {
        Self {
            history_limit,
            default_shutdown_timeout,
        }
    }

    /// Set the history limit
    #[must_use]
    pub const fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Set the default shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.default_shutdown_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_limit: 25,
            default_shutdown_timeout: Duration::from_secs(30),
        }
    }
}
