//! Types module
//!
//! Contains the rule-configuration model and error types used throughout the
//! engine:
//! - `rule`: Response rules (match predicates, actions, delays)
//! - `error`: Error types for the response engine

pub mod error;
pub mod rule;

pub use error::ResponderError;
pub use rule::{Action, Amount, Copy, Correction, Delay, EntryType, Match, Response, Return};
