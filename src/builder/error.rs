//! Build errors for feature and transition builders.

use thiserror::Error;

/// Errors that can occur when building features and transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("Transitions factory not specified. Call .transitions_factory(factory)")]
    MissingTransitionsFactory,

    #[error("Transition source state not specified. Call .from(tag)")]
    MissingFromState,

    #[error("Transition target state not specified. Call .to(tag)")]
    MissingToState,

    #[error("Transition transform not specified. Call .transform(f) or .back_transform(f)")]
    MissingTransform,

    #[error("Transition has both a forward and a back transform or guard")]
    ConflictingTransforms,

    #[error("Back transitions only pop the back stack and take no strategy")]
    StrategyOnBackTransition,

    #[error("An async worker needs a tokio runtime. Build the feature from within one")]
    NoRuntime,
}
