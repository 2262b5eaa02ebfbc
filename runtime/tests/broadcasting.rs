//! Integration tests for action broadcasting through a store and orchestrator
//!
//! Covers multi-step effect chains, request/response correlation over the
//! action bus and lossless fan-out to several subscribers.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use futures::StreamExt;
use roster_core::{Action, Effect, Effects, Reducer, SmallVec, smallvec};
use roster_runtime::{EffectOrchestrator, Store, StoreError};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum JobAction {
    /// Start a multi-step job
    Start { id: u64 },
    /// One step finished
    StepDone { id: u64, step: u32 },
    /// Job finished (terminal)
    Finished { id: u64 },
    /// Job failed (terminal)
    Failed { id: u64, error: String },
    /// Plain counter bump
    Bump,
}

impl Action for JobAction {
    fn action_type(&self) -> &'static str {
        match self {
            Self::Start { .. } => "[Job] Start",
            Self::StepDone { .. } => "[Job] StepDone",
            Self::Finished { .. } => "[Job] Finished",
            Self::Failed { .. } => "[Job] Failed",
            Self::Bump => "[Job] Bump",
        }
    }

    fn is_request(&self) -> bool {
        matches!(self, Self::Start { .. })
    }

    fn is_success(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }

    fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct JobState {
    steps: Vec<(u64, u32)>,
    finished: Vec<u64>,
    bumps: u32,
}

struct JobReducer;

impl Reducer for JobReducer {
    type State = JobState;
    type Action = JobAction;

    fn reduce(&self, state: &Arc<JobState>, action: &JobAction) -> Arc<JobState> {
        let mut next = JobState::clone(state);
        match action {
            JobAction::StepDone { id, step } => next.steps.push((*id, *step)),
            JobAction::Finished { id } => next.finished.push(*id),
            JobAction::Bump => next.bumps += 1,
            JobAction::Start { .. } | JobAction::Failed { .. } => return Arc::clone(state),
        }
        Arc::new(next)
    }
}

/// Three delayed steps per job; job 13 fails on its second step
struct JobEffects;

impl Effects for JobEffects {
    type Action = JobAction;

    fn handle(&self, action: &JobAction) -> SmallVec<[Effect<JobAction>; 4]> {
        match *action {
            JobAction::Start { id } => smallvec![step(id, 1)],
            JobAction::StepDone { id, step: 2 } if id == 13 => smallvec![Effect::Future(Box::pin(async move {
                Some(JobAction::Failed {
                    id,
                    error: "unlucky".into(),
                })
            }))],
            JobAction::StepDone { id, step: n } if n < 3 => smallvec![step(id, n + 1)],
            JobAction::StepDone { id, .. } => smallvec![Effect::Delay {
                duration: Duration::from_millis(5),
                action: Box::new(JobAction::Finished { id }),
            }],
            _ => SmallVec::new(),
        }
    }
}

fn step(id: u64, n: u32) -> Effect<JobAction> {
    Effect::Future(Box::pin(async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Some(JobAction::StepDone { id, step: n })
    }))
}

fn start() -> (Store<JobState, JobAction>, EffectOrchestrator) {
    let store = Store::new(JobState::default(), JobReducer);
    let orchestrator = EffectOrchestrator::spawn(&store, JobEffects);
    (store, orchestrator)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_multi_step_job_reaches_terminal_action() {
    let (store, _orchestrator) = start();

    let outcome = store
        .send_and_wait_for(JobAction::Start { id: 1 }, Action::is_terminal, Duration::from_secs(2))
        .await
        .unwrap();

    assert_eq!(outcome, JobAction::Finished { id: 1 });
    let state = store.snapshot();
    assert_eq!(state.steps, vec![(1, 1), (1, 2), (1, 3)]);
    assert_eq!(state.finished, vec![1]);
}

#[tokio::test]
async fn test_failed_job_reports_failure() {
    let (store, orchestrator) = start();

    let outcome = store
        .send_and_wait_for(JobAction::Start { id: 13 }, Action::is_terminal, Duration::from_secs(2))
        .await
        .unwrap();

    assert!(outcome.is_failure());
    orchestrator.wait_idle().await;
    assert_eq!(store.state(|s| s.steps.clone()), vec![(13, 1), (13, 2)]);
    assert!(store.state(|s| s.finished.is_empty()));
}

#[tokio::test]
async fn test_concurrent_jobs_correlate_by_id() {
    let (store, _orchestrator) = start();

    let waits = (1..=5).map(|id| {
        let store = store.clone();
        async move {
            store
                .send_and_wait_for(
                    JobAction::Start { id },
                    move |a| matches!(a, JobAction::Finished { id: done } if *done == id),
                    Duration::from_secs(2),
                )
                .await
        }
    });
    let outcomes = futures::future::join_all(waits).await;

    for (id, outcome) in (1..=5).zip(outcomes) {
        assert_eq!(outcome.unwrap(), JobAction::Finished { id });
    }
    let mut finished = store.state(|s| s.finished.clone());
    finished.sort_unstable();
    assert_eq!(finished, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_every_subscriber_sees_the_same_sequence() {
    let (store, _orchestrator) = start();
    let first = store.subscribe_actions();
    let second = store.subscribe_actions();

    for _ in 0..500 {
        store.dispatch(JobAction::Bump).unwrap();
    }
    store.shutdown().await.unwrap();

    let first: Vec<_> = first.into_stream().collect().await;
    let second: Vec<_> = second.into_stream().collect().await;

    assert_eq!(first.len(), 500, "no action is dropped");
    assert_eq!(first, second);
    assert_eq!(store.state(|s| s.bumps), 500);
}

#[tokio::test]
async fn test_late_subscriber_only_sees_later_actions() {
    let (store, _orchestrator) = start();
    store.send(JobAction::Bump).await.unwrap();

    let mut late = store.subscribe_actions();
    store.send(JobAction::Bump).await.unwrap();

    assert_eq!(late.try_recv(), Some(JobAction::Bump));
    assert_eq!(late.try_recv(), None);
}

#[tokio::test]
async fn test_wait_fails_after_shutdown() {
    let (store, orchestrator) = start();
    orchestrator.shutdown(Duration::from_secs(1)).await.unwrap();
    store.shutdown().await.unwrap();

    let result = store
        .send_and_wait_for(JobAction::Start { id: 2 }, Action::is_terminal, Duration::from_millis(50))
        .await;
    assert_eq!(result, Err(StoreError::ShutdownInProgress));
}
