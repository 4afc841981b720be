//! Actions are the inputs of a state machine.

use super::state::State;
use std::fmt::Debug;

/// An input event submitted to a state machine.
///
/// An action names a set of legal transitions; which ones is decided by a
/// [`TransitionsFactory`](crate::engine::TransitionsFactory). Actions are
/// usually plain enums whose variants carry the data the transitions need.
///
/// # Example
///
/// ```rust
/// use waypoint::core::Action;
/// use waypoint::fsm_state;
///
/// fsm_state! {
///     pub enum Player: PlayerTag {
///         Stopped,
///         Playing { track: u32 },
///     }
/// }
///
/// #[derive(Debug)]
/// enum PlayerAction {
///     Play(u32),
///     Stop,
/// }
///
/// impl Action for PlayerAction {
///     type State = Player;
///
///     fn name(&self) -> &str {
///         match self {
///             Self::Play(_) => "Play",
///             Self::Stop => "Stop",
///         }
///     }
/// }
/// ```
pub trait Action: Debug + Send + Sync + 'static {
    /// The state type this action drives.
    type State: State;

    /// Get the action's name for display/logging.
    fn name(&self) -> &str;
}
