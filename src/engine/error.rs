//! Engine error types.

use thiserror::Error;

/// Recoverable resolution problems.
///
/// These never abort a submission: the state is left as it was (or the
/// first match wins) and the error is reported through
/// [`TransitionCallbacks::on_transition_error`](super::TransitionCallbacks::on_transition_error).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransitionError {
    #[error("No transition for action '{action}' from state '{state}'")]
    NoTransition { action: String, state: String },

    #[error(
        "Action '{action}' matched {} transitions from state '{state}' ({matched:?}), the first one wins",
        .matched.len()
    )]
    MultipleTransitions {
        action: String,
        state: String,
        matched: Vec<String>,
    },

    #[error("No '{target}' state in back stack for action '{action}' from state '{state}'")]
    NoStateInBackStack {
        action: String,
        state: String,
        target: String,
    },
}

/// Errors that abort a submission or a worker.
#[derive(Debug, Error)]
pub enum FsmError {
    /// The transitions factory broke its contract: no transitions for an
    /// action, or a transform produced a state of the wrong variant.
    #[error("Transitions factory misconfigured for action '{action}': {reason}")]
    MisconfiguredFactory { action: String, reason: String },

    /// An action was submitted from an async task that has been cancelled.
    #[error("Async task was cancelled, action '{action}' dropped")]
    TaskCancelled { action: String },

    /// An async task failed and the worker did not recover the error.
    #[error("Unhandled async task error: {0:#}")]
    TaskFailed(anyhow::Error),
}
