//! A store together with its bound async worker.

use crate::builder::FeatureBuilder;
use crate::core::{Action, BackStateStack, StateWithId};
use crate::engine::{FsmError, LiveStack};
use crate::snapshot::Snapshot;
use crate::store::{StateStream, Store};
use crate::worker::AsyncWorkerHandle;

/// The unit a host application works with: submit actions, read and
/// observe states, and shut the worker down.
///
/// Dropping a feature unbinds its worker.
pub struct Feature<A: Action> {
    store: Store<A>,
    worker: Option<AsyncWorkerHandle<A>>,
}

impl<A: Action> Feature<A> {
    pub fn builder() -> FeatureBuilder<A> {
        FeatureBuilder::new()
    }

    pub(crate) fn new(store: Store<A>, worker: Option<AsyncWorkerHandle<A>>) -> Self {
        Self { store, worker }
    }

    /// Submit an action. See [`Store::submit`].
    pub fn proceed(&self, action: A) -> Result<bool, FsmError> {
        self.store.submit(action)
    }

    pub fn current_state(&self) -> A::State {
        self.store.current_state()
    }

    pub fn current(&self) -> StateWithId<A::State> {
        self.store.current()
    }

    pub fn observe_state(&self) -> StateStream<A::State> {
        self.store.observe()
    }

    pub fn back_stack(&self) -> BackStateStack<A::State> {
        self.store.back_stack()
    }

    pub fn live_stack(&self) -> LiveStack<A::State> {
        self.store.live_stack()
    }

    pub fn snapshot(&self) -> Snapshot<A::State> {
        self.store.snapshot()
    }

    /// The underlying store, for handing to other components.
    pub fn store(&self) -> &Store<A> {
        &self.store
    }

    pub fn has_worker(&self) -> bool {
        self.worker.as_ref().is_some_and(AsyncWorkerHandle::is_bound)
    }

    /// Unbind the worker and wait for its tasks to stop.
    ///
    /// # Errors
    ///
    /// [`FsmError::TaskFailed`] if a task failed and the worker did not
    /// handle the error.
    pub async fn shutdown(&self) -> Result<(), FsmError> {
        match &self.worker {
            Some(worker) => worker.shutdown().await,
            None => Ok(()),
        }
    }
}
