//! State dependency lifecycle.
//!
//! A [`StateDependencyManager`] is told when a state becomes live and when
//! it is evicted, so the host can create and release per-state resources
//! (view models, scoped services, caches) keyed by the state's id.
//!
//! Ordering contract, per submitted action: every `remove` of the step is
//! delivered before its `init`, each id is inited at most once and removed
//! at most once, and no id is removed before it was inited.

use crate::core::{State, StateWithId};
use std::sync::Arc;

/// Observer of states entering and leaving the live stack.
///
/// Both methods are called from inside the store's critical section and
/// must not submit actions back into the same store.
pub trait StateDependencyManager<S: State>: Send + Sync {
    /// `state` became live under `id`.
    fn init_dependency_for_state(&self, id: u64, state: &S);

    /// The state live under `id` was evicted.
    fn remove_dependency_for_state(&self, id: u64, state: &S);
}

impl<S: State, M: StateDependencyManager<S> + ?Sized> StateDependencyManager<S> for Arc<M> {
    fn init_dependency_for_state(&self, id: u64, state: &S) {
        (**self).init_dependency_for_state(id, state)
    }

    fn remove_dependency_for_state(&self, id: u64, state: &S) {
        (**self).remove_dependency_for_state(id, state)
    }
}

/// A lifecycle notification produced by one resolution step.
#[derive(Clone, Debug, PartialEq)]
pub enum DependencyEvent<S: State> {
    Init(StateWithId<S>),
    Remove(StateWithId<S>),
}

impl<S: State> DependencyEvent<S> {
    pub fn id(&self) -> u64 {
        match self {
            Self::Init(entry) | Self::Remove(entry) => entry.id,
        }
    }

    pub fn is_init(&self) -> bool {
        matches!(self, Self::Init(_))
    }

    /// Deliver this event to `manager`.
    pub fn notify(&self, manager: &dyn StateDependencyManager<S>) {
        match self {
            Self::Init(entry) => manager.init_dependency_for_state(entry.id, &entry.state),
            Self::Remove(entry) => manager.remove_dependency_for_state(entry.id, &entry.state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    crate::fsm_state! {
        enum TestState: TestTag {
            Initial,
            Loaded { items: u32 },
        }
    }

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl StateDependencyManager<TestState> for Recorder {
        fn init_dependency_for_state(&self, id: u64, state: &TestState) {
            self.calls.lock().push(format!("init {id} {}", state.name()));
        }

        fn remove_dependency_for_state(&self, id: u64, state: &TestState) {
            self.calls.lock().push(format!("remove {id} {}", state.name()));
        }
    }

    #[test]
    fn notify_dispatches_to_matching_method() {
        let recorder = Recorder::default();
        let events = vec![
            DependencyEvent::Remove(StateWithId::new(1, TestState::Loaded { items: 3 })),
            DependencyEvent::Init(StateWithId::new(2, TestState::Initial)),
        ];

        for event in &events {
            event.notify(&recorder);
        }

        assert_eq!(
            *recorder.calls.lock(),
            vec!["remove 1 Loaded".to_string(), "init 2 Initial".to_string()]
        );
    }

    #[test]
    fn event_exposes_id_and_kind() {
        let init = DependencyEvent::Init(StateWithId::new(7, TestState::Initial));
        let remove = DependencyEvent::Remove(StateWithId::new(8, TestState::Initial));

        assert_eq!(init.id(), 7);
        assert!(init.is_init());
        assert_eq!(remove.id(), 8);
        assert!(!remove.is_init());
    }
}
