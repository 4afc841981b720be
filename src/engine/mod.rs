//! Transition resolution engine.
//!
//! Given the current live stack and an action, the engine selects the one
//! applicable transition, computes the next state and the back stack
//! mutation, and lists the dependency lifecycle events of the step.
//!
//! # Key Concepts
//!
//! - **Factory**: `TransitionsFactory` maps an action to its ordered transitions
//! - **Live stack**: `LiveStack` holds the current state, history and id counter
//! - **Resolution**: `resolve` is pure; the store commits its result
//! - **Callbacks**: `TransitionCallbacks` observe every step

mod callbacks;
mod error;
mod factory;
mod live_stack;
mod resolve;

pub use callbacks::{TracingCallbacks, TransitionCallbacks};
pub use error::{FsmError, TransitionError};
pub use factory::TransitionsFactory;
pub use live_stack::LiveStack;
pub use resolve::{resolve, Resolution};
