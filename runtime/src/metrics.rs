//! Metrics for observability
//!
//! The runtime only talks to the `metrics` facade. Whichever recorder the host
//! installs (Prometheus, statsd, a test recorder) receives these series; with
//! no recorder installed every call is a no-op.
//!
//! | Name | Kind | Meaning |
//! |---|---|---|
//! | `store.actions.total` | counter | Actions accepted by a store |
//! | `store.reducer.duration_seconds` | histogram | Time spent in one reducer step |
//! | `store.state.changes` | counter | Reducer steps that produced a new state |
//! | `store.shutdown.rejected_actions` | counter | Actions refused after shutdown |
//! | `orchestrator.effects.executed` | counter (`type`) | Effects started, by variant |
//! | `orchestrator.effects.pending` | gauge | Effects currently in flight |

use metrics::{describe_counter, describe_gauge, describe_histogram};
use std::time::Duration;

pub use metrics::{counter, gauge, histogram};

/// Register descriptions for every series the runtime emits.
///
/// Call once after installing a recorder so exporters can render help text.
pub fn describe_metrics() {
    describe_counter!("store.actions.total", "Total number of actions accepted by a store");
    describe_histogram!(
        "store.reducer.duration_seconds",
        "Time taken by a single reducer step"
    );
    describe_counter!(
        "store.state.changes",
        "Number of reducer steps that produced a new state value"
    );
    describe_counter!(
        "store.shutdown.rejected_actions",
        "Actions rejected because the store was shutting down"
    );
    describe_counter!(
        "orchestrator.effects.executed",
        "Effects started by the orchestrator, labelled by type"
    );
    describe_gauge!(
        "orchestrator.effects.pending",
        "Effects currently in flight"
    );
}

/// Store metrics recorder.
pub struct StoreMetrics;

impl StoreMetrics {
    /// Record an accepted action.
    pub fn record_action() {
        counter!("store.actions.total").increment(1);
    }

    /// Record one reducer step.
    pub fn record_reduce(duration: Duration, changed: bool) {
        histogram!("store.reducer.duration_seconds").record(duration.as_secs_f64());
        if changed {
            counter!("store.state.changes").increment(1);
        }
    }

    /// Record an action refused during shutdown.
    pub fn record_rejection() {
        counter!("store.shutdown.rejected_actions").increment(1);
    }
}

/// Orchestrator metrics recorder.
pub struct OrchestratorMetrics;

impl OrchestratorMetrics {
    /// Record a started effect of the given kind.
    pub fn record_effect(kind: &'static str) {
        counter!("orchestrator.effects.executed", "type" => kind).increment(1);
    }

    /// Record the number of effects in flight.
    // Precision loss is irrelevant for in-flight counts
    #[allow(clippy::cast_precision_loss)]
    pub fn record_pending(pending: usize) {
        gauge!("orchestrator.effects.pending").set(pending as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorders_without_installed_recorder() {
        // No recorder installed: every call must be a silent no-op
        describe_metrics();
        StoreMetrics::record_action();
        StoreMetrics::record_reduce(Duration::from_micros(5), true);
        StoreMetrics::record_rejection();
        OrchestratorMetrics::record_effect("future");
        OrchestratorMetrics::record_pending(3);
    }
}
