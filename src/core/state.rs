//! Core State trait for state machine states.
//!
//! All state machine states must implement this trait, which provides
//! pure methods for inspecting state properties without side effects.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Id reserved for the initial state of a machine.
///
/// The initial state is never pushed onto the back stack and never
/// removed, so this id stays live for the lifetime of the machine.
pub const ROOT_ID: u64 = 0;

/// Trait for state machine states.
///
/// States are immutable values compared by structural equality. Every
/// variant also exposes an explicit discriminant through [`State::tag`],
/// which is what transitions match on.
///
/// # Required Traits
///
/// - `Clone`: States are copied into the back stack and the broadcast
/// - `PartialEq`: Unchanged states are never republished
/// - `Debug`: States must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: States must be serializable for snapshots
///
/// Most machines derive all of this with [`fsm_state!`](crate::fsm_state).
///
/// # Example
///
/// ```rust
/// use waypoint::core::{State, StateTag};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Screen {
///     Home,
///     Details { item: u32 },
/// }
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// enum ScreenTag {
///     Home,
///     Details,
/// }
///
/// impl StateTag for ScreenTag {
///     type State = Screen;
/// }
///
/// impl State for Screen {
///     type Tag = ScreenTag;
///
///     fn tag(&self) -> ScreenTag {
///         match self {
///             Self::Home => ScreenTag::Home,
///             Self::Details { .. } => ScreenTag::Details,
///         }
///     }
///
///     fn name(&self) -> &str {
///         match self {
///             Self::Home => "Home",
///             Self::Details { .. } => "Details",
///         }
///     }
/// }
///
/// assert_eq!(Screen::Details { item: 7 }.tag(), ScreenTag::Details);
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Discriminant identifying a state variant independently of its payload.
    type Tag: StateTag<State = Self>;

    /// Get the discriminant of this state's variant.
    fn tag(&self) -> Self::Tag;

    /// Get the state's variant name for display/logging.
    fn name(&self) -> &str;
}

/// Discriminant of a state variant.
///
/// Links back to its state type, so a tag alone is enough to know which
/// machine a transition belongs to.
pub trait StateTag: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    type State: State;
}

/// A state stamped with the identity it holds while it is live.
///
/// Ids are handed out by the machine in strictly increasing order and are
/// never reused, so an id names exactly one stay of a state on the live
/// stack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateWithId<S: State> {
    pub id: u64,
    pub state: S,
}

impl<S: State> StateWithId<S> {
    pub fn new(id: u64, state: S) -> Self {
        Self { id, state }
    }

    /// The entry for a machine's initial state.
    pub fn root(state: S) -> Self {
        Self::new(ROOT_ID, state)
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_ID
    }

    pub fn tag(&self) -> S::Tag {
        self.state.tag()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::fsm_state! {
        enum TestState: TestTag {
            Initial,
            Processing { step: u32 },
            Complete { label: String },
        }
    }

    #[test]
    fn tag_ignores_payload() {
        let a = TestState::Processing { step: 1 };
        let b = TestState::Processing { step: 2 };

        assert_ne!(a, b);
        assert_eq!(a.tag(), b.tag());
        assert_eq!(a.tag(), TestTag::Processing);
    }

    #[test]
    fn name_returns_variant_name() {
        assert_eq!(TestState::Initial.name(), "Initial");
        assert_eq!(TestState::Processing { step: 3 }.name(), "Processing");
        assert_eq!(
            TestState::Complete {
                label: "done".to_string()
            }
            .name(),
            "Complete"
        );
    }

    #[test]
    fn root_entry_uses_reserved_id() {
        let root = StateWithId::root(TestState::Initial);
        assert!(root.is_root());
        assert_eq!(root.id, ROOT_ID);
        assert!(!StateWithId::new(4, TestState::Initial).is_root());
    }

    #[test]
    fn state_with_id_serializes_correctly() {
        let entry = StateWithId::new(
            3,
            TestState::Complete {
                label: "async1".to_string(),
            },
        );
        let json = serde_json::to_string(&entry).unwrap();
        let deserialized: StateWithId<TestState> = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, deserialized);
    }
}
