//! Shared fixtures for integration tests.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::time::Duration;
use waypoint::core::{Action, BackStackStrategy, Transition};
use waypoint::engine::{TransitionCallbacks, TransitionError};
use waypoint::worker::{AsyncWorker, AsyncWorkerTask};
use waypoint::{fsm_state, State, StateDependencyManager};

/// Install a test subscriber. Output is controlled with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Give spawned tasks a chance to run; with a paused clock this also
/// fires every timer due within `millis`.
pub async fn settle(millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

fsm_state! {
    pub enum TestState: TestTag {
        Initial,
        Async { label: String, milliseconds: u64 },
        Complete { label: String },
        Error,
    }
}

#[derive(Debug, Clone)]
pub enum TestAction {
    Start { label: String, milliseconds: u64 },
    Finish { success: bool },
    Back,
    Close,
}

impl TestAction {
    pub fn start(label: &str, milliseconds: u64) -> Self {
        Self::Start {
            label: label.to_string(),
            milliseconds,
        }
    }
}

impl Action for TestAction {
    type State = TestState;

    fn name(&self) -> &str {
        match self {
            Self::Start { .. } => "Start",
            Self::Finish { .. } => "Finish",
            Self::Back => "Back",
            Self::Close => "Close",
        }
    }
}

pub fn transitions(action: &TestAction) -> Vec<Transition<TestState>> {
    match action {
        TestAction::Start {
            label,
            milliseconds,
        } => {
            let (label, milliseconds) = (label.clone(), *milliseconds);
            vec![
                Transition::forward(TestTag::Initial, TestTag::Async, move |_| TestState::Async {
                    label: label.clone(),
                    milliseconds,
                })
                .named("Start")
                .strategy(BackStackStrategy::Add),
            ]
        }
        TestAction::Finish { success } => {
            let success = *success;
            vec![
                Transition::forward(TestTag::Async, TestTag::Complete, |state| match state {
                    TestState::Async { label, .. } => TestState::Complete {
                        label: label.clone(),
                    },
                    other => other.clone(),
                })
                .named("Success")
                .when(move |_| success)
                .strategy(BackStackStrategy::Add),
                Transition::forward(TestTag::Async, TestTag::Error, |_| TestState::Error)
                    .named("Error")
                    .when(move |_| !success),
            ]
        }
        TestAction::Back => vec![
            Transition::back(TestTag::Complete, TestTag::Async, |_, async_state| {
                async_state.clone()
            })
            .named("BackToAsync"),
            Transition::back(TestTag::Error, TestTag::Async, |_, async_state| {
                async_state.clone()
            })
            .named("RetryAsync"),
        ],
        TestAction::Close => vec![
            Transition::forward(TestTag::Complete, TestTag::Initial, |_| TestState::Initial)
                .named("Close")
                .strategy(BackStackStrategy::NewRoot),
            Transition::forward(TestTag::Error, TestTag::Initial, |_| TestState::Initial)
                .named("Dismiss")
                .strategy(BackStackStrategy::NewRoot),
        ],
    }
}

/// Finishes every `Async` state after its delay.
pub struct TestAsyncWorker;

impl AsyncWorker<TestAction> for TestAsyncWorker {
    fn on_next_state(&self, state: &TestState) -> AsyncWorkerTask<TestAction> {
        match state {
            TestState::Async { milliseconds, .. } => {
                let delay = Duration::from_millis(*milliseconds);
                AsyncWorkerTask::execute_and_cancel_exist(state.clone(), move |ctx| async move {
                    tokio::time::sleep(delay).await;
                    ctx.proceed(TestAction::Finish { success: true })?;
                    Ok(())
                })
            }
            _ => AsyncWorkerTask::Cancel,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Init(u64, TestTag),
    Remove(u64, TestTag),
}

/// Records dependency lifecycle events in delivery order.
#[derive(Default)]
pub struct DependencyLog {
    events: Mutex<Vec<Lifecycle>>,
}

impl DependencyLog {
    pub fn events(&self) -> Vec<Lifecycle> {
        self.events.lock().clone()
    }

    pub fn take(&self) -> Vec<Lifecycle> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl StateDependencyManager<TestState> for DependencyLog {
    fn init_dependency_for_state(&self, id: u64, state: &TestState) {
        self.events.lock().push(Lifecycle::Init(id, state.tag()));
    }

    fn remove_dependency_for_state(&self, id: u64, state: &TestState) {
        self.events.lock().push(Lifecycle::Remove(id, state.tag()));
    }
}

/// Records every diagnostic reported while resolving actions.
#[derive(Default)]
pub struct DiagnosticLog {
    errors: Mutex<Vec<TransitionError>>,
}

impl DiagnosticLog {
    pub fn errors(&self) -> Vec<TransitionError> {
        self.errors.lock().clone()
    }
}

impl<A: Action> TransitionCallbacks<A> for DiagnosticLog {
    fn on_transition_error(&self, _action: &A, _state: &A::State, error: &TransitionError) {
        self.errors.lock().push(error.clone());
    }
}
