//! Back navigation history.
//!
//! The back stack is an ordered sequence of previously entered states,
//! most recent last, each stamped with the id it holds while live.

use super::state::{State, StateWithId};
use serde::{Deserialize, Serialize};

/// Ordered, identity-stamped history of visited states.
///
/// Ids strictly increase from bottom to top. The stack is unbounded;
/// entries only leave it through [`push`](Self::push) with `reset_root`,
/// [`pop_and_get_removed`](Self::pop_and_get_removed) and [`pop`](Self::pop).
///
/// # Example
///
/// ```rust
/// use waypoint::core::{BackStateStack, State, StateWithId};
/// use waypoint::fsm_state;
///
/// fsm_state! {
///     enum Page: PageTag {
///         List,
///         Item { id: u32 },
///         Edit { id: u32 },
///     }
/// }
///
/// let mut stack = BackStateStack::new();
/// stack.push(StateWithId::new(1, Page::List), false);
/// stack.push(StateWithId::new(2, Page::Item { id: 9 }), false);
/// stack.push(StateWithId::new(3, Page::Edit { id: 9 }), false);
///
/// let (target, removed) = stack.pop_and_get_removed(PageTag::Item).unwrap();
/// assert_eq!(target.id, 2);
/// assert_eq!(removed.len(), 1);
/// assert_eq!(removed[0].id, 3);
/// assert_eq!(stack.len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct BackStateStack<S: State> {
    entries: Vec<StateWithId<S>>,
}

impl<S: State> Default for BackStateStack<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> BackStateStack<S> {
    /// Create a new empty stack.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append `entry` on top, first removing every entry if `reset_root`
    /// is set.
    ///
    /// Returns the entries removed by the reset, oldest first (empty when
    /// not resetting). The new entry's id must be greater than every id
    /// currently on the stack.
    pub fn push(&mut self, entry: StateWithId<S>, reset_root: bool) -> Vec<StateWithId<S>> {
        debug_assert!(
            self.top().is_none_or(|top| top.id < entry.id),
            "back stack ids must strictly increase"
        );

        let removed = if reset_root {
            std::mem::take(&mut self.entries)
        } else {
            Vec::new()
        };
        self.entries.push(entry);
        removed
    }

    /// Find the most recent entry whose state has `tag`, without mutating.
    pub fn peek(&self, tag: S::Tag) -> Option<&StateWithId<S>> {
        self.entries.iter().rev().find(|entry| entry.tag() == tag)
    }

    /// Remove the most recent entry tagged `tag` and every entry above it.
    ///
    /// Returns the matched entry and the entries that were above it, oldest
    /// first. Entries below the match are never touched. Returns `None`
    /// and leaves the stack unchanged when nothing matches.
    pub fn pop_and_get_removed(
        &mut self,
        tag: S::Tag,
    ) -> Option<(StateWithId<S>, Vec<StateWithId<S>>)> {
        let position = self.entries.iter().rposition(|entry| entry.tag() == tag)?;
        let mut removed = self.entries.split_off(position);
        let target = removed.remove(0);
        Some((target, removed))
    }

    /// Remove and return the top entry.
    pub fn pop(&mut self) -> Option<StateWithId<S>> {
        self.entries.pop()
    }

    /// Remove every entry, returning them oldest first.
    pub fn clear(&mut self) -> Vec<StateWithId<S>> {
        std::mem::take(&mut self.entries)
    }

    pub fn top(&self) -> Option<&StateWithId<S>> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[StateWithId<S>] {
        &self.entries
    }

    /// Whether ids strictly increase from bottom to top.
    pub fn is_well_ordered(&self) -> bool {
        self.entries.windows(2).all(|pair| pair[0].id < pair[1].id)
    }
}
