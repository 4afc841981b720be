//! Builder API for ergonomic feature construction.
//!
//! This module provides fluent builders and the `fsm_state!` macro for
//! declaring states, transitions and features with minimal boilerplate
//! while maintaining type safety.

pub mod error;
pub mod feature;
pub mod macros;
pub mod transition;

pub use error::BuildError;
pub use feature::FeatureBuilder;
pub use transition::TransitionBuilder;
