//! Hooks into the resolution of every submitted action.

use super::error::TransitionError;
use crate::core::{Action, State, Transition};
use std::sync::Arc;

/// Callbacks invoked while an action is resolved, for logging, debugging
/// or metrics.
///
/// All methods default to no-ops. They run inside the store's critical
/// section and must not submit actions back into the same store.
pub trait TransitionCallbacks<A: Action>: Send + Sync {
    /// An action was submitted while in `state`.
    fn on_action_launched(&self, _action: &A, _state: &A::State) {}

    /// `transition` was selected to handle `action`.
    fn on_transition_selected(
        &self,
        _action: &A,
        _transition: &Transition<A::State>,
        _state: &A::State,
    ) {
    }

    /// `transition` reduced `old_state` to `new_state` (possibly equal).
    fn on_new_state_reduced(
        &self,
        _action: &A,
        _transition: &Transition<A::State>,
        _old_state: &A::State,
        _new_state: &A::State,
    ) {
    }

    /// A recoverable resolution problem occurred.
    fn on_transition_error(&self, _action: &A, _state: &A::State, _error: &TransitionError) {}
}

impl<A: Action, C: TransitionCallbacks<A> + ?Sized> TransitionCallbacks<A> for Arc<C> {
    fn on_action_launched(&self, action: &A, state: &A::State) {
        (**self).on_action_launched(action, state)
    }

    fn on_transition_selected(
        &self,
        action: &A,
        transition: &Transition<A::State>,
        state: &A::State,
    ) {
        (**self).on_transition_selected(action, transition, state)
    }

    fn on_new_state_reduced(
        &self,
        action: &A,
        transition: &Transition<A::State>,
        old_state: &A::State,
        new_state: &A::State,
    ) {
        (**self).on_new_state_reduced(action, transition, old_state, new_state)
    }

    fn on_transition_error(&self, action: &A, state: &A::State, error: &TransitionError) {
        (**self).on_transition_error(action, state, error)
    }
}

/// [`TransitionCallbacks`] that reports every event through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingCallbacks;

impl<A: Action> TransitionCallbacks<A> for TracingCallbacks {
    fn on_action_launched(&self, action: &A, state: &A::State) {
        tracing::debug!(action = action.name(), state = state.name(), "Action launched");
    }

    fn on_transition_selected(
        &self,
        action: &A,
        transition: &Transition<A::State>,
        state: &A::State,
    ) {
        tracing::debug!(
            action = action.name(),
            transition = transition.name(),
            state = state.name(),
            "Transition selected"
        );
    }

    fn on_new_state_reduced(
        &self,
        action: &A,
        transition: &Transition<A::State>,
        old_state: &A::State,
        new_state: &A::State,
    ) {
        tracing::info!(
            action = action.name(),
            transition = transition.name(),
            from = ?old_state,
            to = ?new_state,
            "New state reduced"
        );
    }

    fn on_transition_error(&self, action: &A, state: &A::State, error: &TransitionError) {
        tracing::warn!(action = action.name(), state = state.name(), %error, "Transition error");
    }
}
