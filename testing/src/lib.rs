//! # Roster Testing
//!
//! Testing utilities and helpers for the Roster state container.
//!
//! This crate provides:
//! - Mock implementations of environment traits (`FixedClock`, `MockHttpClient`)
//! - The `ReducerTest` Given-When-Then harness
//! - Tracing setup for tests
//!
//! ## Example
//!
//! ```ignore
//! use roster_testing::http::{Method, MockHttpClient};
//! use roster_runtime::{EffectOrchestrator, Store};
//!
//! #[tokio::test]
//! async fn test_load_users() {
//!     let http = MockHttpClient::new()
//!         .with_response(Method::Get, "http://localhost:3001/users", Ok(json!([])));
//!     let store = Store::new(UserState::default(), UserReducer);
//!     let _orchestrator = EffectOrchestrator::spawn(&store, UserEffects::new(UserApi::new(http, base)));
//!
//!     store.dispatch(UserAction::LoadUsers)?;
//! }
//! ```

use chrono::{DateTime, Utc};
use roster_core::environment::Clock;

/// Scripted request capability
pub mod http;


/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use roster_testing::mocks::FixedClock;
    /// use roster_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Test helpers and utilities
pub mod helpers {
    use tracing_subscriber::EnvFilter;

    /// Install a test-friendly tracing subscriber
    ///
    /// Output goes through the test harness' capture. Honors `RUST_LOG`,
    /// defaulting to `debug`. Safe to call from every test: only the first
    /// call installs anything.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    }
}

// Re-export commonly used items
pub use http::{Method, MockHttpClient, RecordedCall};
pub use mocks::{FixedClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};
