//! Instructions an async worker hands to its supervisor.

use crate::core::Action;
use crate::engine::FsmError;
use crate::store::Store;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

/// Boxed future of a background job.
pub type TaskFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// Background work, started with the context of its job.
pub type Work<A> = Box<dyn FnOnce(TaskContext<A>) -> TaskFuture + Send>;

/// What the supervisor should do for a newly published state.
pub enum AsyncWorkerTask<A: Action> {
    /// Cancel the running job, if any.
    Cancel,

    /// Cancel the running job, if any, then start `work` for `state`.
    ExecuteAndCancelExist { state: A::State, work: Work<A> },

    /// Start `work` for `state` unless a job launched for an equal state is
    /// still running. Any other running job is cancelled first.
    ExecuteIfNotExist { state: A::State, work: Work<A> },
}

impl<A: Action> AsyncWorkerTask<A> {
    pub fn execute_and_cancel_exist<F, Fut>(state: A::State, work: F) -> Self
    where
        F: FnOnce(TaskContext<A>) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::ExecuteAndCancelExist {
            state,
            work: Box::new(move |ctx| Box::pin(work(ctx))),
        }
    }

    pub fn execute_if_not_exist<F, Fut>(state: A::State, work: F) -> Self
    where
        F: FnOnce(TaskContext<A>) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::ExecuteIfNotExist {
            state,
            work: Box::new(move |ctx| Box::pin(work(ctx))),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Cancel => "Cancel",
            Self::ExecuteAndCancelExist { .. } => "ExecuteAndCancelExist",
            Self::ExecuteIfNotExist { .. } => "ExecuteIfNotExist",
        }
    }
}

impl<A: Action> fmt::Debug for AsyncWorkerTask<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancel => f.write_str("Cancel"),
            Self::ExecuteAndCancelExist { state, .. } | Self::ExecuteIfNotExist { state, .. } => f
                .debug_struct(self.kind())
                .field("state", state)
                .finish_non_exhaustive(),
        }
    }
}

/// Handle a running job uses to talk back to its store.
///
/// Once the job is cancelled, [`proceed`](Self::proceed) refuses every
/// action, so a replaced job can no longer change the state.
pub struct TaskContext<A: Action> {
    store: Store<A>,
    token: CancellationToken,
}

impl<A: Action> Clone for TaskContext<A> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            token: self.token.clone(),
        }
    }
}

impl<A: Action> TaskContext<A> {
    pub(crate) fn new(store: Store<A>, token: CancellationToken) -> Self {
        Self { store, token }
    }

    /// Submit an action to the store this job belongs to.
    ///
    /// # Errors
    ///
    /// [`FsmError::TaskCancelled`] if the job was cancelled, checked inside
    /// the store's critical section. Otherwise as [`Store::submit`].
    pub fn proceed(&self, action: A) -> Result<bool, FsmError> {
        let token = &self.token;
        self.store.submit_if(action, || !token.is_cancelled())
    }

    pub fn current_state(&self) -> A::State {
        self.store.current_state()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the job is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}
