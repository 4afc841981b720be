//! Builder for constructing features.

use crate::builder::error::BuildError;
use crate::core::Action;
use crate::dependency::StateDependencyManager;
use crate::engine::{TransitionCallbacks, TransitionsFactory};
use crate::feature::Feature;
use crate::snapshot::StateKeeper;
use crate::store::{Store, StoreParts};
use crate::worker::{AsyncWorker, AsyncWorkerHandle};
use std::sync::Arc;

/// Builder for constructing a [`Feature`] with a fluent API.
pub struct FeatureBuilder<A: Action> {
    initial: Option<A::State>,
    factory: Option<Arc<dyn TransitionsFactory<A>>>,
    dependencies: Option<Arc<dyn StateDependencyManager<A::State>>>,
    callbacks: Option<Arc<dyn TransitionCallbacks<A>>>,
    keeper: Option<Arc<dyn StateKeeper<A::State>>>,
    worker: Option<Arc<dyn AsyncWorker<A>>>,
}

impl<A: Action> FeatureBuilder<A> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            initial: None,
            factory: None,
            dependencies: None,
            callbacks: None,
            keeper: None,
            worker: None,
        }
    }

    /// Set the initial state (required). Ignored when a state keeper
    /// restores a snapshot.
    pub fn initial(mut self, state: A::State) -> Self {
        self.initial = Some(state);
        self
    }

    /// Set the transitions factory (required).
    pub fn transitions_factory<F>(mut self, factory: F) -> Self
    where
        F: TransitionsFactory<A> + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Receive state dependency lifecycle events (optional).
    pub fn dependency_manager<M>(mut self, manager: M) -> Self
    where
        M: StateDependencyManager<A::State> + 'static,
    {
        self.dependencies = Some(Arc::new(manager));
        self
    }

    /// Observe every resolution step (optional).
    pub fn callbacks<C>(mut self, callbacks: C) -> Self
    where
        C: TransitionCallbacks<A> + 'static,
    {
        self.callbacks = Some(Arc::new(callbacks));
        self
    }

    /// Restore from and save snapshots to `keeper` (optional).
    pub fn state_keeper<K>(mut self, keeper: K) -> Self
    where
        K: StateKeeper<A::State> + 'static,
    {
        self.keeper = Some(Arc::new(keeper));
        self
    }

    /// Bind an async worker when the feature is built (optional).
    pub fn async_worker<W>(mut self, worker: W) -> Self
    where
        W: AsyncWorker<A>,
    {
        self.worker = Some(Arc::new(worker));
        self
    }

    /// Build the feature.
    /// Returns an error if required fields are missing, or if an async
    /// worker is set outside a tokio runtime.
    pub fn build(self) -> Result<Feature<A>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;
        let factory = self.factory.ok_or(BuildError::MissingTransitionsFactory)?;

        if self.worker.is_some() && tokio::runtime::Handle::try_current().is_err() {
            return Err(BuildError::NoRuntime);
        }

        let store = Store::open(StoreParts {
            initial,
            factory,
            dependencies: self.dependencies,
            callbacks: self.callbacks,
            keeper: self.keeper,
        });
        let worker = self
            .worker
            .map(|worker| AsyncWorkerHandle::bind(worker, store.clone()));

        Ok(Feature::new(store, worker))
    }
}

impl<A: Action> Default for FeatureBuilder<A> {
    fn default() -> Self {
        Self::new()
    }
}
