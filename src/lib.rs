//! Waypoint: a reactive finite-state-machine runtime
//!
//! Waypoint keeps the "pure core, imperative shell" split: transition
//! resolution is a pure function over the live stack, while the store,
//! the dependency notifications and the async worker form the shell
//! around it.
//!
//! # Core Concepts
//!
//! - **State / Action**: closed enums; every action lists its transitions
//! - **Back stack**: identity-stamped history for back navigation
//! - **Dependencies**: `init`/`remove` events as states enter and leave the live stack
//! - **Store**: serialized submissions and a replay-latest state stream
//! - **Async worker**: background work launched and cancelled per state
//!
//! # Example
//!
//! ```rust
//! use waypoint::core::{Action, BackStackStrategy, Transition};
//! use waypoint::{fsm_state, Feature};
//!
//! fsm_state! {
//!     pub enum Wizard: WizardTag {
//!         Welcome,
//!         Account { email: String },
//!         Confirm,
//!     }
//! }
//!
//! #[derive(Debug)]
//! enum WizardAction {
//!     Next(String),
//!     Confirm,
//!     Back,
//! }
//!
//! impl Action for WizardAction {
//!     type State = Wizard;
//!     fn name(&self) -> &str {
//!         match self {
//!             WizardAction::Next(_) => "Next",
//!             WizardAction::Confirm => "Confirm",
//!             WizardAction::Back => "Back",
//!         }
//!     }
//! }
//!
//! let feature = Feature::<WizardAction>::builder()
//!     .initial(Wizard::Welcome)
//!     .transitions_factory(|action: &WizardAction| match action {
//!         WizardAction::Next(email) => {
//!             let email = email.clone();
//!             vec![Transition::forward(WizardTag::Welcome, WizardTag::Account, move |_| {
//!                 Wizard::Account { email: email.clone() }
//!             })
//!             .strategy(BackStackStrategy::Add)]
//!         }
//!         WizardAction::Confirm => vec![
//!             Transition::forward(WizardTag::Account, WizardTag::Confirm, |_| Wizard::Confirm)
//!                 .strategy(BackStackStrategy::Add),
//!         ],
//!         WizardAction::Back => vec![Transition::back(WizardTag::Confirm, WizardTag::Account, |_, account| {
//!             account.clone()
//!         })],
//!     })
//!     .build()
//!     .unwrap();
//!
//! feature.proceed(WizardAction::Next("ada@example.org".into())).unwrap();
//! feature.proceed(WizardAction::Confirm).unwrap();
//! feature.proceed(WizardAction::Back).unwrap();
//!
//! assert_eq!(
//!     feature.current_state(),
//!     Wizard::Account { email: "ada@example.org".into() }
//! );
//! assert_eq!(feature.current().id, 1);
//! ```

pub mod builder;
pub mod core;
pub mod dependency;
pub mod engine;
pub mod feature;
pub mod snapshot;
pub mod store;
pub mod worker;

// Re-export commonly used types
pub use builder::{BuildError, FeatureBuilder, TransitionBuilder};
pub use core::{Action, BackStackStrategy, BackStateStack, State, StateWithId, Transition};
pub use dependency::StateDependencyManager;
pub use engine::{FsmError, TracingCallbacks, TransitionCallbacks, TransitionError};
pub use feature::Feature;
pub use store::{StateStream, Store};
pub use worker::{AsyncWorker, AsyncWorkerHandle, AsyncWorkerTask, TaskContext};
