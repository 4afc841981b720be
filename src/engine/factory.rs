//! Source of the transitions legal for an action.

use crate::core::{Action, Transition};

/// Produces the ordered list of transitions declared for an action.
///
/// Contract relied on by the engine:
/// - the list is non-empty for every action;
/// - every transition carries its `from`/`to` tags, and its transform
///   yields a state tagged `to`;
/// - the order is stable for a given action variant. When several
///   transitions match, the first one in this order is applied.
///
/// Any `Fn(&A) -> Vec<Transition<_>>` closure is a factory, so a `match`
/// over the action enum is a complete, exhaustively checked registration
/// table.
///
/// # Example
///
/// ```rust
/// use waypoint::core::{Action, BackStackStrategy, Transition};
/// use waypoint::engine::TransitionsFactory;
/// use waypoint::fsm_state;
///
/// fsm_state! {
///     pub enum Door: DoorTag {
///         Closed,
///         Open,
///     }
/// }
///
/// #[derive(Debug)]
/// enum DoorAction {
///     Push,
/// }
///
/// impl Action for DoorAction {
///     type State = Door;
///     fn name(&self) -> &str {
///         "Push"
///     }
/// }
///
/// let factory = |action: &DoorAction| match action {
///     DoorAction::Push => vec![
///         Transition::forward(DoorTag::Closed, DoorTag::Open, |_| Door::Open)
///             .strategy(BackStackStrategy::Add),
///         Transition::forward(DoorTag::Open, DoorTag::Closed, |_| Door::Closed),
///     ],
/// };
///
/// assert_eq!(factory.create(&DoorAction::Push).len(), 2);
/// ```
pub trait TransitionsFactory<A: Action>: Send + Sync {
    fn create(&self, action: &A) -> Vec<Transition<A::State>>;
}

impl<A, F> TransitionsFactory<A> for F
where
    A: Action,
    F: Fn(&A) -> Vec<Transition<A::State>> + Send + Sync,
{
    fn create(&self, action: &A) -> Vec<Transition<A::State>> {
        self(action)
    }
}
