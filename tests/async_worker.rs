//! Async worker behaviour observed through a feature.

mod common;

use common::{init_tracing, settle, transitions, TestAction, TestState};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use waypoint::worker::{AsyncWorker, AsyncWorkerTask, TaskContext};
use waypoint::{Feature, FeatureBuilder, FsmError};

#[derive(Clone, Copy)]
enum Launch {
    IfNotExist,
    CancelExist,
}

/// Launches a long job for every `Async` state and records its context.
/// The job marker ignores the label, so every `Async` state counts as the
/// same job for deduplication.
struct Counting {
    launch: Launch,
    contexts: Arc<Mutex<Vec<TaskContext<TestAction>>>>,
}

impl AsyncWorker<TestAction> for Counting {
    fn on_next_state(&self, state: &TestState) -> AsyncWorkerTask<TestAction> {
        let TestState::Async { .. } = state else {
            return AsyncWorkerTask::Cancel;
        };
        let marker = TestState::Async {
            label: String::new(),
            milliseconds: 0,
        };
        let contexts = Arc::clone(&self.contexts);
        let work = move |ctx: TaskContext<TestAction>| async move {
            contexts.lock().push(ctx.clone());
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        };
        match self.launch {
            Launch::IfNotExist => AsyncWorkerTask::execute_if_not_exist(marker, work),
            Launch::CancelExist => AsyncWorkerTask::execute_and_cancel_exist(marker, work),
        }
    }
}

/// Transitions that allow moving between `Async` states.
fn relaunching(action: &TestAction) -> Vec<waypoint::Transition<TestState>> {
    let mut list = transitions(action);
    if let TestAction::Start {
        label,
        milliseconds,
    } = action
    {
        let (label, milliseconds) = (label.clone(), *milliseconds);
        list.push(waypoint::Transition::forward(
            common::TestTag::Async,
            common::TestTag::Async,
            move |_| TestState::Async {
                label: label.clone(),
                milliseconds,
            },
        ));
    }
    list
}

fn counting_feature(launch: Launch) -> (Feature<TestAction>, Arc<Mutex<Vec<TaskContext<TestAction>>>>) {
    let contexts = Arc::new(Mutex::new(Vec::new()));
    let feature = FeatureBuilder::<TestAction>::new()
        .initial(TestState::Initial)
        .transitions_factory(relaunching)
        .async_worker(Counting {
            launch,
            contexts: Arc::clone(&contexts),
        })
        .build()
        .unwrap();
    (feature, contexts)
}

#[tokio::test(start_paused = true)]
async fn execute_if_not_exist_launches_once_while_running() {
    init_tracing();
    let (feature, contexts) = counting_feature(Launch::IfNotExist);

    feature.proceed(TestAction::start("a", 1)).unwrap();
    settle(1).await;
    feature.proceed(TestAction::start("b", 1)).unwrap();
    settle(1).await;

    let contexts = contexts.lock().clone();
    assert_eq!(contexts.len(), 1);
    assert!(!contexts[0].is_cancelled());

    feature.shutdown().await.unwrap();
    assert!(contexts[0].is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn execute_and_cancel_exist_launches_twice_cancelling_first() {
    init_tracing();
    let (feature, contexts) = counting_feature(Launch::CancelExist);

    feature.proceed(TestAction::start("a", 1)).unwrap();
    settle(1).await;
    feature.proceed(TestAction::start("b", 1)).unwrap();
    settle(1).await;

    let contexts = contexts.lock().clone();
    assert_eq!(contexts.len(), 2);
    assert!(contexts[0].is_cancelled());
    assert!(!contexts[1].is_cancelled());

    // the replaced job can no longer drive the machine
    let stale = contexts[0].proceed(TestAction::Finish { success: true });
    assert!(matches!(stale, Err(FsmError::TaskCancelled { .. })));
    assert!(matches!(feature.current_state(), TestState::Async { .. }));

    assert!(contexts[1].proceed(TestAction::Finish { success: true }).unwrap());
    assert!(matches!(feature.current_state(), TestState::Complete { .. }));
}

struct Failing {
    handled: Option<Arc<AtomicUsize>>,
}

impl AsyncWorker<TestAction> for Failing {
    fn on_next_state(&self, state: &TestState) -> AsyncWorkerTask<TestAction> {
        match state {
            TestState::Async { .. } => AsyncWorkerTask::execute_and_cancel_exist(state.clone(), |_ctx| async {
                anyhow::bail!("connection reset")
            }),
            _ => AsyncWorkerTask::Cancel,
        }
    }

    fn on_task_error(&self, error: anyhow::Error) -> anyhow::Result<()> {
        match &self.handled {
            Some(count) => {
                count.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            None => Err(error),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn unhandled_task_error_surfaces_on_shutdown() {
    init_tracing();
    let feature = FeatureBuilder::<TestAction>::new()
        .initial(TestState::Initial)
        .transitions_factory(transitions)
        .async_worker(Failing { handled: None })
        .build()
        .unwrap();

    feature.proceed(TestAction::start("a", 1)).unwrap();
    settle(1).await;

    assert!(!feature.has_worker());
    let error = feature.shutdown().await.unwrap_err();
    assert!(error.to_string().contains("connection reset"));

    // the store keeps working without the worker
    assert!(feature.proceed(TestAction::Finish { success: true }).unwrap());
}

#[tokio::test(start_paused = true)]
async fn handled_task_error_keeps_worker_running() {
    let handled = Arc::new(AtomicUsize::new(0));
    let feature = FeatureBuilder::<TestAction>::new()
        .initial(TestState::Initial)
        .transitions_factory(transitions)
        .async_worker(Failing {
            handled: Some(Arc::clone(&handled)),
        })
        .build()
        .unwrap();

    feature.proceed(TestAction::start("a", 1)).unwrap();
    settle(1).await;

    assert_eq!(handled.load(Ordering::SeqCst), 1);
    assert!(feature.has_worker());
    assert!(feature.shutdown().await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn dropping_feature_cancels_running_job() {
    let (feature, contexts) = counting_feature(Launch::CancelExist);

    feature.proceed(TestAction::start("a", 1)).unwrap();
    settle(1).await;
    let context = contexts.lock()[0].clone();
    assert!(!context.is_cancelled());

    drop(feature);

    assert!(context.is_cancelled());
}
