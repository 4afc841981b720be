//! Async task supervision driven by the state stream.
//!
//! An [`AsyncWorker`] decides, for every published state, whether
//! background work should start, be replaced, or stop. The work runs on
//! the tokio runtime and feeds results back through
//! [`TaskContext::proceed`], which is an ordinary store submission.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use waypoint::core::{Action, BackStackStrategy, Transition};
//! use waypoint::fsm_state;
//! use waypoint::store::Store;
//! use waypoint::worker::{AsyncWorker, AsyncWorkerHandle, AsyncWorkerTask};
//!
//! fsm_state! {
//!     pub enum Fetch: FetchTag {
//!         Idle,
//!         Loading,
//!         Done,
//!     }
//! }
//!
//! #[derive(Debug)]
//! enum FetchAction {
//!     Load,
//!     Loaded,
//! }
//!
//! impl Action for FetchAction {
//!     type State = Fetch;
//!     fn name(&self) -> &str {
//!         match self {
//!             FetchAction::Load => "Load",
//!             FetchAction::Loaded => "Loaded",
//!         }
//!     }
//! }
//!
//! struct Loader;
//!
//! impl AsyncWorker<FetchAction> for Loader {
//!     fn on_next_state(&self, state: &Fetch) -> AsyncWorkerTask<FetchAction> {
//!         match state {
//!             Fetch::Loading => AsyncWorkerTask::execute_if_not_exist(state.clone(), |ctx| async move {
//!                 tokio::time::sleep(Duration::from_millis(5)).await;
//!                 ctx.proceed(FetchAction::Loaded)?;
//!                 Ok(())
//!             }),
//!             _ => AsyncWorkerTask::Cancel,
//!         }
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Store::new(Fetch::Idle, |action: &FetchAction| match action {
//!     FetchAction::Load => vec![Transition::forward(FetchTag::Idle, FetchTag::Loading, |_| Fetch::Loading)],
//!     FetchAction::Loaded => vec![
//!         Transition::forward(FetchTag::Loading, FetchTag::Done, |_| Fetch::Done)
//!             .strategy(BackStackStrategy::Add),
//!     ],
//! });
//! let worker = AsyncWorkerHandle::bind(std::sync::Arc::new(Loader), store.clone());
//!
//! let mut states = store.observe();
//! store.submit(FetchAction::Load).unwrap();
//! while let Some(state) = states.recv().await {
//!     if state == Fetch::Done {
//!         break;
//!     }
//! }
//! worker.shutdown().await.unwrap();
//! # }
//! ```

mod supervisor;
mod task;

pub use supervisor::AsyncWorkerHandle;
pub use task::{AsyncWorkerTask, TaskContext, TaskFuture, Work};

use crate::core::Action;

/// Decides which background work belongs to each state.
pub trait AsyncWorker<A: Action>: Send + Sync + 'static {
    /// Called for every published state, in publish order.
    fn on_next_state(&self, state: &A::State) -> AsyncWorkerTask<A>;

    /// Called with an error a job returned while it was not cancelled.
    ///
    /// Returning `Ok(())` recovers and keeps the worker bound. The default
    /// returns the error, which stops the worker; the error is then
    /// reported by [`AsyncWorkerHandle::shutdown`].
    fn on_task_error(&self, error: anyhow::Error) -> anyhow::Result<()> {
        Err(error)
    }

    /// Called when deciding the task for a state failed, i.e.
    /// [`on_next_state`](Self::on_next_state) panicked.
    ///
    /// Returning `Ok(())` skips that state and keeps the subscription
    /// running. The default returns the error and stops the worker.
    fn on_state_subscription_error(&self, error: anyhow::Error) -> anyhow::Result<()> {
        Err(error)
    }
}
