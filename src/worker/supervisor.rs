//! Supervisor binding an [`AsyncWorker`] to a store.

use super::task::{AsyncWorkerTask, TaskContext, Work};
use super::AsyncWorker;
use crate::core::Action;
use crate::engine::FsmError;
use crate::store::{StateStream, Store};
use futures_util::FutureExt;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct Job {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Job {
    fn is_active(&self) -> bool {
        !self.token.is_cancelled() && !self.handle.is_finished()
    }
}

/// The task scope: at most one job, and the state it was launched for.
struct TaskSlot<S> {
    launched_state: Option<S>,
    job: Option<Job>,
}

impl<S: PartialEq> TaskSlot<S> {
    fn is_running_for(&self, state: &S) -> bool {
        self.job.as_ref().is_some_and(Job::is_active) && self.launched_state.as_ref() == Some(state)
    }

    /// Request cancellation of the running job and forget it.
    fn cancel(&mut self) -> Option<JoinHandle<()>> {
        self.launched_state = None;
        self.job.take().map(|job| {
            job.token.cancel();
            job.handle
        })
    }
}

struct Supervisor<A: Action> {
    worker: Arc<dyn AsyncWorker<A>>,
    store: Store<A>,
    slot: Mutex<TaskSlot<A::State>>,
    failure: Mutex<Option<anyhow::Error>>,
    teardown: CancellationToken,
}

impl<A: Action> Supervisor<A> {
    async fn run(self: Arc<Self>, mut states: StateStream<A::State>, token: CancellationToken) {
        tracing::trace!("Async worker subscribed");
        loop {
            let state = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                next = states.recv() => match next {
                    Some(state) => state,
                    None => break,
                },
            };
            let decided = catch_unwind(AssertUnwindSafe(|| self.worker.on_next_state(&state)));
            match decided {
                Ok(task) => self.handle(task),
                Err(payload) => {
                    let error = panic_error("on_next_state", payload.as_ref());
                    if !self.subscription_failed(error) {
                        break;
                    }
                }
            }
        }
        tracing::trace!("Async worker subscription closed");
    }

    fn handle(self: &Arc<Self>, task: AsyncWorkerTask<A>) {
        let mut slot = self.slot.lock();
        match task {
            AsyncWorkerTask::Cancel => {
                if slot.cancel().is_some() {
                    tracing::debug!("Async task cancelled");
                }
            }
            AsyncWorkerTask::ExecuteAndCancelExist { state, work } => {
                if slot.cancel().is_some() {
                    tracing::debug!(state = ?state, "Replacing running async task");
                }
                self.launch(&mut slot, state, work);
            }
            AsyncWorkerTask::ExecuteIfNotExist { state, work } => {
                if slot.is_running_for(&state) {
                    tracing::debug!(state = ?state, "Async task already running, skipped");
                    return;
                }
                slot.cancel();
                self.launch(&mut slot, state, work);
            }
        }
    }

    fn launch(self: &Arc<Self>, slot: &mut TaskSlot<A::State>, state: A::State, work: Work<A>) {
        if self.teardown.is_cancelled() {
            return;
        }
        tracing::debug!(state = ?state, "Launching async task");

        let token = self.teardown.child_token();
        let context = TaskContext::new(self.store.clone(), token.clone());
        let future = match catch_unwind(AssertUnwindSafe(|| work(context))) {
            Ok(future) => AssertUnwindSafe(future).catch_unwind(),
            Err(payload) => {
                token.cancel();
                self.task_failed(panic_error("async task", payload.as_ref()));
                return;
            }
        };
        let supervisor = Arc::clone(self);
        let job_token = token.clone();
        let handle = tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                _ = job_token.cancelled() => return,
                result = future => result.unwrap_or_else(|payload| {
                    Err(panic_error("async task", payload.as_ref()))
                }),
            };
            if let Err(error) = result {
                if !job_token.is_cancelled() {
                    supervisor.task_failed(error);
                }
            }
        });

        slot.launched_state = Some(state);
        slot.job = Some(Job { token, handle });
    }

    fn task_failed(&self, error: anyhow::Error) {
        match self.worker.on_task_error(error) {
            Ok(()) => tracing::debug!("Async task error handled by worker"),
            Err(error) => {
                tracing::error!("Unhandled async task error, stopping worker: {error:#}");
                self.fail(error);
            }
        }
    }

    /// Returns whether the subscription keeps running.
    fn subscription_failed(&self, error: anyhow::Error) -> bool {
        match self.worker.on_state_subscription_error(error) {
            Ok(()) => {
                tracing::debug!("State subscription error handled by worker");
                true
            }
            Err(error) => {
                tracing::error!("Unhandled state subscription error, stopping worker: {error:#}");
                self.fail(error);
                false
            }
        }
    }

    fn fail(&self, error: anyhow::Error) {
        self.failure.lock().get_or_insert(error);
        self.teardown.cancel();
    }
}

fn panic_error(origin: &str, payload: &(dyn Any + Send)) -> anyhow::Error {
    let message = payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    anyhow::anyhow!("{origin} panicked: {message}")
}

/// A running binding between an [`AsyncWorker`] and a store.
///
/// The subscription processes published states strictly in order and
/// runs at most one job at a time. Dropping the handle unbinds it.
pub struct AsyncWorkerHandle<A: Action> {
    supervisor: Arc<Supervisor<A>>,
    subscription: Mutex<Option<JoinHandle<()>>>,
}

impl<A: Action> AsyncWorkerHandle<A> {
    /// Subscribe `worker` to `store`. The worker first sees the current
    /// state.
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(worker: Arc<dyn AsyncWorker<A>>, store: Store<A>) -> Self {
        let teardown = CancellationToken::new();
        let states = store.observe();
        let supervisor = Arc::new(Supervisor {
            worker,
            store,
            slot: Mutex::new(TaskSlot {
                launched_state: None,
                job: None,
            }),
            failure: Mutex::new(None),
            teardown,
        });

        let subscription = tokio::spawn(
            Arc::clone(&supervisor).run(states, supervisor.teardown.child_token()),
        );

        Self {
            supervisor,
            subscription: Mutex::new(Some(subscription)),
        }
    }

    /// Whether the subscription is still running. False after an unbind,
    /// an unhandled task error or an unhandled subscription error.
    pub fn is_bound(&self) -> bool {
        !self.supervisor.teardown.is_cancelled()
    }

    /// Whether a job is currently running.
    pub fn has_active_task(&self) -> bool {
        self.supervisor
            .slot
            .lock()
            .job
            .as_ref()
            .is_some_and(Job::is_active)
    }

    /// Cancel the subscription and the running job. Idempotent.
    pub fn unbind(&self) {
        for handle in self.stop() {
            handle.abort();
        }
    }

    /// Unbind and wait for the subscription and the job to finish.
    ///
    /// # Errors
    ///
    /// [`FsmError::TaskFailed`] with the first task or subscription error
    /// the worker did not handle. Panics count as errors.
    pub async fn shutdown(&self) -> Result<(), FsmError> {
        for handle in self.stop() {
            // cancelled tasks end with a JoinError we do not care about
            let _ = handle.await;
        }
        match self.supervisor.failure.lock().take() {
            Some(error) => Err(FsmError::TaskFailed(error)),
            None => Ok(()),
        }
    }

    fn stop(&self) -> Vec<JoinHandle<()>> {
        if !self.supervisor.teardown.is_cancelled() {
            tracing::trace!("Unbinding async worker");
        }
        self.supervisor.teardown.cancel();
        let mut handles: Vec<_> = self.subscription.lock().take().into_iter().collect();
        handles.extend(self.supervisor.slot.lock().cancel());
        handles
    }
}

impl<A: Action> Drop for AsyncWorkerHandle<A> {
    fn drop(&mut self) {
        self.unbind();
    }
}
