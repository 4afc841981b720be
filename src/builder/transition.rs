//! Builder for constructing transitions.

use crate::builder::error::BuildError;
use crate::core::{
    BackGuard, BackStackStrategy, BackTransform, Guard, State, StateTag, Transform, Transition,
    TransitionKind,
};

/// Builder for constructing transitions with a fluent API.
///
/// Whether the result is a forward or a back transition follows from the
/// transform: [`transform`](Self::transform) builds a forward transition,
/// [`back_transform`](Self::back_transform) a back transition.
pub struct TransitionBuilder<S: State> {
    name: Option<String>,
    from: Option<S::Tag>,
    to: Option<S::Tag>,
    guard: Option<Guard<S>>,
    back_guard: Option<BackGuard<S>>,
    transform: Option<Transform<S>>,
    back_transform: Option<BackTransform<S>>,
    strategy: Option<BackStackStrategy>,
}

impl<S: State> TransitionBuilder<S> {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self {
            name: None,
            from: None,
            to: None,
            guard: None,
            back_guard: None,
            transform: None,
            back_transform: None,
            strategy: None,
        }
    }

    /// Set a display name (optional, defaults to `"From -> To"`).
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the source state variant (required).
    pub fn from<T>(mut self, tag: T) -> Self
    where
        T: StateTag<State = S>,
        S: State<Tag = T>,
    {
        self.from = Some(tag);
        self
    }

    /// Set the target state variant (required).
    pub fn to<T>(mut self, tag: T) -> Self
    where
        T: StateTag<State = S>,
        S: State<Tag = T>,
    {
        self.to = Some(tag);
        self
    }

    /// Add a guard on the current state (optional).
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Add a guard on the current state and the history entry a back
    /// transition returns to (optional, back transitions only).
    pub fn when_back<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&S, &S) -> bool + Send + Sync + 'static,
    {
        self.back_guard = Some(BackGuard::new(predicate));
        self
    }

    /// Set the forward transform.
    pub fn transform<F>(mut self, f: F) -> Self
    where
        F: Fn(&S) -> S + Send + Sync + 'static,
    {
        self.transform = Some(Box::new(f));
        self
    }

    /// Set the back transform, receiving the current state and the
    /// history entry tagged `to`.
    pub fn back_transform<F>(mut self, f: F) -> Self
    where
        F: Fn(&S, &S) -> S + Send + Sync + 'static,
    {
        self.back_transform = Some(Box::new(f));
        self
    }

    /// Set the back stack strategy (optional, forward transitions only).
    pub fn strategy(mut self, strategy: BackStackStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<Transition<S>, BuildError> {
        let from = self.from.ok_or(BuildError::MissingFromState)?;
        let to = self.to.ok_or(BuildError::MissingToState)?;

        let kind = match (self.transform, self.back_transform) {
            (Some(_), Some(_)) => return Err(BuildError::ConflictingTransforms),
            (None, None) => return Err(BuildError::MissingTransform),
            (Some(transform), None) => {
                if self.back_guard.is_some() {
                    return Err(BuildError::ConflictingTransforms);
                }
                TransitionKind::Forward {
                    guard: self.guard,
                    transform,
                    strategy: self.strategy.unwrap_or_default(),
                }
            }
            (None, Some(transform)) => {
                if self.strategy.is_some() {
                    return Err(BuildError::StrategyOnBackTransition);
                }
                let guard = match (self.guard, self.back_guard) {
                    (Some(_), Some(_)) => return Err(BuildError::ConflictingTransforms),
                    (Some(guard), None) => Some(BackGuard::new(move |state, _| guard.check(state))),
                    (None, back_guard) => back_guard,
                };
                TransitionKind::Back { guard, transform }
            }
        };

        let transition = Transition::from_parts(from, to, kind);
        Ok(match self.name {
            Some(name) => transition.named(name),
            None => transition,
        })
    }
}

impl<S: State> Default for TransitionBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
