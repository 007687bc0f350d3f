//! Transition planning
//!
//! [`validator`] decides whether two tracks can be beat-matched at all;
//! [`calculator`] turns a pair of analyses into a concrete crossfade
//! plan. Both are pure so plans are reproducible.

pub mod calculator;
pub mod validator;

pub use calculator::{BeatSync, CrossfadeCalculator, CrossfadeConfig};
pub use validator::{TransitionValidator, ValidationResult};
