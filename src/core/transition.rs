//! State transitions: guarded, pure rules from one state variant to another.

use super::guard::{BackGuard, Guard};
use super::state::{State, StateTag};

/// Pure function computing the next state from the current one.
pub type Transform<S> = Box<dyn Fn(&S) -> S + Send + Sync>;

/// Pure function computing the next state from the current one and the
/// history entry a back transition returns to.
pub type BackTransform<S> = Box<dyn Fn(&S, &S) -> S + Send + Sync>;

/// How a forward transition writes to the back stack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackStackStrategy {
    /// No stack write; the new state is a transient leaf.
    #[default]
    None,

    /// Push the new state on top of the history.
    Add,

    /// Evict the whole history, then push the new state as its new base.
    NewRoot,
}

/// The two shapes a transition can take.
pub enum TransitionKind<S: State> {
    Forward {
        guard: Option<Guard<S>>,
        transform: Transform<S>,
        strategy: BackStackStrategy,
    },
    /// Returns to the most recent history entry tagged `to`, popping
    /// everything above it.
    Back {
        guard: Option<BackGuard<S>>,
        transform: BackTransform<S>,
    },
}

/// A transition from one state variant to another.
///
/// Transitions are created per action by a
/// [`TransitionsFactory`](crate::engine::TransitionsFactory) and can capture
/// the action's data in their guard and transform.
///
/// # Example
///
/// ```rust
/// use waypoint::core::{BackStackStrategy, State, Transition};
/// use waypoint::fsm_state;
///
/// fsm_state! {
///     enum Auth: AuthTag {
///         LoggedOut,
///         LoggedIn { user: String },
///     }
/// }
///
/// let user = "ada".to_string();
/// let login = Transition::forward(AuthTag::LoggedOut, AuthTag::LoggedIn, move |_| {
///     Auth::LoggedIn { user: user.clone() }
/// })
/// .named("Login")
/// .strategy(BackStackStrategy::NewRoot);
///
/// assert!(login.can_execute(&Auth::LoggedOut, None));
/// assert_eq!(
///     login.apply(&Auth::LoggedOut, None),
///     Some(Auth::LoggedIn { user: "ada".into() })
/// );
/// ```
pub struct Transition<S: State> {
    name: String,
    from: S::Tag,
    to: S::Tag,
    kind: TransitionKind<S>,
}

impl<S: State> Transition<S> {
    /// Create an unguarded forward transition with [`BackStackStrategy::None`].
    pub fn forward<T, F>(from: T, to: T, transform: F) -> Self
    where
        T: StateTag<State = S>,
        S: State<Tag = T>,
        F: Fn(&S) -> S + Send + Sync + 'static,
    {
        Self::from_parts(
            from,
            to,
            TransitionKind::Forward {
                guard: None,
                transform: Box::new(transform),
                strategy: BackStackStrategy::None,
            },
        )
    }

    /// Create an unguarded back transition.
    ///
    /// The transform receives the current state and the history entry
    /// tagged `to`.
    pub fn back<T, F>(from: T, to: T, transform: F) -> Self
    where
        T: StateTag<State = S>,
        S: State<Tag = T>,
        F: Fn(&S, &S) -> S + Send + Sync + 'static,
    {
        Self::from_parts(
            from,
            to,
            TransitionKind::Back {
                guard: None,
                transform: Box::new(transform),
            },
        )
    }

    pub(crate) fn from_parts(from: S::Tag, to: S::Tag, kind: TransitionKind<S>) -> Self {
        Self {
            name: format!("{from:?} -> {to:?}"),
            from,
            to,
            kind,
        }
    }

    /// Set a display name (defaults to `"From -> To"`).
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Guard the transition with a predicate on the current state.
    ///
    /// On a back transition the history entry is not passed to the
    /// predicate; use [`TransitionBuilder::when_back`](crate::builder::TransitionBuilder::when_back)
    /// for that.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        match &mut self.kind {
            TransitionKind::Forward { guard, .. } => *guard = Some(Guard::new(predicate)),
            TransitionKind::Back { guard, .. } => {
                *guard = Some(BackGuard::new(move |state, _| predicate(state)))
            }
        }
        self
    }

    /// Set the back stack strategy. Back transitions only pop, so this has
    /// no effect on them.
    pub fn strategy(mut self, strategy: BackStackStrategy) -> Self {
        if let TransitionKind::Forward { strategy: s, .. } = &mut self.kind {
            *s = strategy;
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn from_tag(&self) -> S::Tag {
        self.from
    }

    pub fn to_tag(&self) -> S::Tag {
        self.to
    }

    pub fn kind(&self) -> &TransitionKind<S> {
        &self.kind
    }

    pub fn is_back(&self) -> bool {
        matches!(self.kind, TransitionKind::Back { .. })
    }

    /// Strategy of a forward transition, `None` for back transitions.
    pub fn back_stack_strategy(&self) -> Option<BackStackStrategy> {
        match &self.kind {
            TransitionKind::Forward { strategy, .. } => Some(*strategy),
            TransitionKind::Back { .. } => None,
        }
    }

    /// Check if this transition can execute from the current state (pure).
    ///
    /// `back_state` is the history entry a back transition would return
    /// to; a back transition without one never executes.
    pub fn can_execute(&self, current: &S, back_state: Option<&S>) -> bool {
        if current.tag() != self.from {
            return false;
        }

        match &self.kind {
            TransitionKind::Forward { guard, .. } => guard.as_ref().is_none_or(|g| g.check(current)),
            TransitionKind::Back { guard, .. } => back_state.is_some_and(|back| {
                back.tag() == self.to && guard.as_ref().is_none_or(|g| g.check(current, back))
            }),
        }
    }

    /// Compute the next state (pure). Returns `None` for a back transition
    /// without a history entry.
    pub fn apply(&self, current: &S, back_state: Option<&S>) -> Option<S> {
        match &self.kind {
            TransitionKind::Forward { transform, .. } => Some(transform(current)),
            TransitionKind::Back { transform, .. } => back_state.map(|back| transform(current, back)),
        }
    }
}

impl<S: State> std::fmt::Debug for Transition<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("name", &self.name)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("back", &self.is_back())
            .field("strategy", &self.back_stack_strategy())
            .finish()
    }
}
