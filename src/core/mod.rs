//! Core state machine types.
//!
//! This module contains the pure data model of the state machine:
//! - States and actions via the `State` and `Action` traits
//! - Guard predicates and transitions
//! - The identity-stamped back navigation stack
//!
//! Nothing in this module performs I/O or locking.

mod action;
mod back_stack;
mod guard;
mod state;
mod transition;

pub use action::Action;
pub use back_stack::BackStateStack;
pub use guard::{BackGuard, Guard};
pub use state::{State, StateTag, StateWithId, ROOT_ID};
pub use transition::{BackStackStrategy, BackTransform, Transform, Transition, TransitionKind};
