//! Transition resolution: select and apply the one transition for an action.

use super::callbacks::TransitionCallbacks;
use super::error::{FsmError, TransitionError};
use super::live_stack::LiveStack;
use crate::core::{Action, State, Transition};
use crate::dependency::DependencyEvent;

/// Outcome of resolving one action.
#[derive(Clone, Debug)]
pub struct Resolution<S: State> {
    /// The live stack after the step, `None` when the state did not change.
    pub next: Option<LiveStack<S>>,

    /// Dependency lifecycle events of the step, removes before the init.
    pub events: Vec<DependencyEvent<S>>,

    /// Recoverable problems met while resolving, already reported to the
    /// callbacks.
    pub diagnostics: Vec<TransitionError>,
}

impl<S: State> Resolution<S> {
    fn unchanged(diagnostics: Vec<TransitionError>) -> Self {
        Self {
            next: None,
            events: Vec::new(),
            diagnostics,
        }
    }

    pub fn is_changed(&self) -> bool {
        self.next.is_some()
    }
}

struct Candidate<'t, S: State> {
    transition: &'t Transition<S>,
    back_state: Option<S>,
}

/// Resolve `action` against `live` using the factory-produced `transitions`.
///
/// Pure with respect to `live`: the caller commits [`Resolution::next`] and
/// delivers [`Resolution::events`]. Transitions whose `from` tag matches the
/// current state and whose guard holds are candidates; back transitions
/// additionally need a history entry tagged `to`. The first candidate in
/// factory order is applied.
///
/// # Errors
///
/// [`FsmError::MisconfiguredFactory`] when `transitions` is empty or the
/// selected transform yields a state not tagged with the transition's `to`.
pub fn resolve<A: Action>(
    action: &A,
    transitions: &[Transition<A::State>],
    live: &LiveStack<A::State>,
    callbacks: Option<&dyn TransitionCallbacks<A>>,
) -> Result<Resolution<A::State>, FsmError> {
    let old_state = live.current_state();
    if let Some(cb) = callbacks {
        cb.on_action_launched(action, old_state);
    }

    if transitions.is_empty() {
        return Err(FsmError::MisconfiguredFactory {
            action: action.name().to_string(),
            reason: "no transitions declared for this action".to_string(),
        });
    }

    let history = live.history();
    let mut candidates = Vec::new();
    let mut missing_back_target = None;

    for transition in transitions {
        if transition.from_tag() != old_state.tag() {
            continue;
        }

        let back_state = if transition.is_back() {
            match history.peek(transition.to_tag()) {
                Some(entry) => Some(entry.state.clone()),
                None => {
                    missing_back_target.get_or_insert(transition.to_tag());
                    continue;
                }
            }
        } else {
            None
        };

        if transition.can_execute(old_state, back_state.as_ref()) {
            candidates.push(Candidate {
                transition,
                back_state,
            });
        }
    }

    tracing::trace!(
        action = action.name(),
        state = old_state.name(),
        declared = transitions.len(),
        matched = candidates.len(),
        "Filtered transitions"
    );

    let mut diagnostics = Vec::new();
    let mut report = |error: TransitionError| {
        if let Some(cb) = callbacks {
            cb.on_transition_error(action, old_state, &error);
        }
        diagnostics.push(error);
    };

    if candidates.len() > 1 {
        report(TransitionError::MultipleTransitions {
            action: action.name().to_string(),
            state: old_state.name().to_string(),
            matched: candidates
                .iter()
                .map(|c| c.transition.name().to_string())
                .collect(),
        });
    }

    let Some(selected) = candidates.into_iter().next() else {
        report(match missing_back_target {
            Some(target) => TransitionError::NoStateInBackStack {
                action: action.name().to_string(),
                state: old_state.name().to_string(),
                target: format!("{target:?}"),
            },
            None => TransitionError::NoTransition {
                action: action.name().to_string(),
                state: old_state.name().to_string(),
            },
        });
        return Ok(Resolution::unchanged(diagnostics));
    };

    let transition = selected.transition;
    if let Some(cb) = callbacks {
        cb.on_transition_selected(action, transition, old_state);
    }

    let Some(new_state) = transition.apply(old_state, selected.back_state.as_ref()) else {
        return Ok(Resolution::unchanged(diagnostics));
    };

    if new_state.tag() != transition.to_tag() {
        return Err(FsmError::MisconfiguredFactory {
            action: action.name().to_string(),
            reason: format!(
                "transition '{}' produced state '{}', expected {:?}",
                transition.name(),
                new_state.name(),
                transition.to_tag()
            ),
        });
    }

    if let Some(cb) = callbacks {
        cb.on_new_state_reduced(action, transition, old_state, &new_state);
    }

    if new_state == *old_state {
        return Ok(Resolution::unchanged(diagnostics));
    }

    tracing::debug!(
        action = action.name(),
        transition = transition.name(),
        from = old_state.name(),
        to = new_state.name(),
        "Applying transition"
    );

    let mut next = live.clone();
    let events = match transition.back_stack_strategy() {
        Some(strategy) => next.advance(new_state, strategy),
        None => match next.return_to(transition.to_tag(), new_state) {
            Some(events) => events,
            None => {
                report(TransitionError::NoStateInBackStack {
                    action: action.name().to_string(),
                    state: old_state.name().to_string(),
                    target: format!("{:?}", transition.to_tag()),
                });
                return Ok(Resolution::unchanged(diagnostics));
            }
        },
    };

    Ok(Resolution {
        next: Some(next),
        events,
        diagnostics,
    })
}
