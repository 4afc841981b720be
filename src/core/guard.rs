//! Guard predicates for controlling state transitions.
//!
//! Guards are pure boolean functions that determine whether a transition
//! can execute. They enable declarative transition rules without side effects.

use super::state::State;

/// Pure predicate that determines if a transition can execute.
///
/// Guards are evaluated while the engine selects a transition, after the
/// `from` tag already matched.
///
/// # Example
///
/// ```rust
/// use waypoint::core::Guard;
/// use waypoint::fsm_state;
///
/// fsm_state! {
///     enum Upload: UploadTag {
///         Idle,
///         Sending { percent: u8 },
///     }
/// }
///
/// let almost_done = Guard::new(|s: &Upload| matches!(s, Upload::Sending { percent } if *percent > 90));
///
/// assert!(almost_done.check(&Upload::Sending { percent: 95 }));
/// assert!(!almost_done.check(&Upload::Sending { percent: 10 }));
/// assert!(!almost_done.check(&Upload::Idle));
/// ```
pub struct Guard<S: State> {
    predicate: Box<dyn Fn(&S) -> bool + Send + Sync>,
}

impl<S: State> Guard<S> {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be pure (deterministic, no side effects) and
    /// thread-safe (Send + Sync).
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Check if the guard allows transition from this state.
    pub fn check(&self, state: &S) -> bool {
        (self.predicate)(state)
    }
}

/// Guard of a back transition.
///
/// Receives the current state and the history entry the transition would
/// return to.
pub struct BackGuard<S: State> {
    predicate: Box<dyn Fn(&S, &S) -> bool + Send + Sync>,
}

impl<S: State> BackGuard<S> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&S, &S) -> bool + Send + Sync + 'static,
    {
        BackGuard {
            predicate: Box::new(predicate),
        }
    }

    pub fn check(&self, state: &S, back_state: &S) -> bool {
        (self.predicate)(state, back_state)
    }
}
