//! The set of live states owned by one machine.

use crate::core::{BackStackStrategy, BackStateStack, State, StateWithId, ROOT_ID};
use crate::dependency::DependencyEvent;
use serde::{Deserialize, Serialize};

/// Current state, back navigation history and id counter of a machine.
///
/// The current state is either the top of the back stack (entered through
/// [`BackStackStrategy::Add`], [`BackStackStrategy::NewRoot`] or a back
/// transition) or a leaf (the root, or entered through
/// [`BackStackStrategy::None`]). The root state is never pushed and never
/// removed. Ids come from a counter and are never reused.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct LiveStack<S: State> {
    root: StateWithId<S>,
    current: StateWithId<S>,
    back_stack: BackStateStack<S>,
    last_id: u64,
}

impl<S: State> LiveStack<S> {
    pub fn new(initial: S) -> Self {
        let root = StateWithId::root(initial);
        Self {
            current: root.clone(),
            root,
            back_stack: BackStateStack::new(),
            last_id: ROOT_ID,
        }
    }

    pub fn current(&self) -> &StateWithId<S> {
        &self.current
    }

    pub fn current_state(&self) -> &S {
        &self.current.state
    }

    pub fn root(&self) -> &StateWithId<S> {
        &self.root
    }

    pub fn back_stack(&self) -> &BackStateStack<S> {
        &self.back_stack
    }

    pub fn last_id(&self) -> u64 {
        self.last_id
    }

    /// Whether the current state sits on top of the back stack.
    pub fn is_current_pushed(&self) -> bool {
        self.back_stack
            .top()
            .is_some_and(|top| top.id == self.current.id)
    }

    /// The entries a back transition can return to: the back stack without
    /// the current state.
    pub fn history(&self) -> BackStateStack<S> {
        let mut history = self.back_stack.clone();
        if self.is_current_pushed() {
            history.pop();
        }
        history
    }

    /// Every live entry: root, back stack and current, ordered by id.
    pub fn live_entries(&self) -> Vec<&StateWithId<S>> {
        let mut entries = vec![&self.root];
        entries.extend(self.back_stack.entries());
        if !self.is_current_pushed() && !self.current.is_root() {
            entries.push(&self.current);
        }
        entries
    }

    /// Check the structural invariants (used when restoring snapshots).
    pub fn validate(&self) -> Result<(), String> {
        if !self.root.is_root() {
            return Err(format!("root entry has id {}, expected {ROOT_ID}", self.root.id));
        }
        if !self.back_stack.is_well_ordered() {
            return Err("back stack ids are not strictly increasing".to_string());
        }
        if let Some(first) = self.back_stack.entries().first() {
            if first.is_root() {
                return Err("root entry must not be on the back stack".to_string());
            }
        }
        if self.current.is_root() && self.current != self.root {
            return Err("current state claims the root id".to_string());
        }
        if let Some(top) = self.back_stack.top() {
            if top.id == self.current.id && top.state != self.current.state {
                return Err(format!(
                    "current state and back stack top share id {} but differ",
                    top.id
                ));
            }
            if !self.current.is_root() && self.current.id < top.id {
                return Err(format!(
                    "leaf current id {} is below back stack top id {}",
                    self.current.id, top.id
                ));
            }
        }
        let max_id = self
            .back_stack
            .top()
            .map_or(self.current.id, |top| top.id.max(self.current.id));
        if max_id > self.last_id {
            return Err(format!(
                "id {max_id} is above the id counter {}",
                self.last_id
            ));
        }
        Ok(())
    }

    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    /// The current state stops being live unless it stays in history or
    /// is the root.
    fn leaving_current(&self, current_pushed: bool) -> Option<DependencyEvent<S>> {
        (!current_pushed && !self.current.is_root())
            .then(|| DependencyEvent::Remove(self.current.clone()))
    }

    /// Enter `state` through a forward transition.
    ///
    /// Returns the dependency events of the step, removes first.
    pub(crate) fn advance(
        &mut self,
        state: S,
        strategy: BackStackStrategy,
    ) -> Vec<DependencyEvent<S>> {
        let current_pushed = self.is_current_pushed();
        let entry = StateWithId::new(self.next_id(), state);

        let mut events: Vec<DependencyEvent<S>> = match strategy {
            BackStackStrategy::None => Vec::new(),
            BackStackStrategy::Add => {
                self.back_stack.push(entry.clone(), false);
                Vec::new()
            }
            BackStackStrategy::NewRoot => self
                .back_stack
                .push(entry.clone(), true)
                .into_iter()
                .map(DependencyEvent::Remove)
                .collect(),
        };

        events.extend(self.leaving_current(current_pushed));
        events.push(DependencyEvent::Init(entry.clone()));
        self.current = entry;
        events
    }

    /// Return to the most recent history entry tagged `target`, entering
    /// `state` there.
    ///
    /// Everything above the target is evicted. If `state` equals the
    /// target's state the target keeps its id, otherwise it is replaced by
    /// a fresh entry. Returns `None`, leaving `self` untouched, when the
    /// history has no such entry.
    pub(crate) fn return_to(&mut self, target: S::Tag, state: S) -> Option<Vec<DependencyEvent<S>>> {
        let mut history = self.history();
        let (target, above) = history.pop_and_get_removed(target)?;
        self.back_stack = history;

        let reinstated = target.state == state;
        let mut events = Vec::new();
        if !reinstated {
            events.push(DependencyEvent::Remove(target.clone()));
        }
        events.extend(above.into_iter().map(DependencyEvent::Remove));
        // history() already dropped a pushed current, so it always leaves
        events.extend(self.leaving_current(false));

        let entry = if reinstated {
            target
        } else {
            let entry = StateWithId::new(self.next_id(), state);
            events.push(DependencyEvent::Init(entry.clone()));
            entry
        };
        self.back_stack.push(entry.clone(), false);
        self.current = entry;
        Some(events)
    }
}
