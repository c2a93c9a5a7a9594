//! Errors raised while describing or matching on a machine.
//!
//! The transition step itself has no error type: an unhandled pair is an
//! ignored transition, not a failure.

use thiserror::Error;

/// A transition table entry that names a tag outside its domain.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("Transition table declares unknown state '{state}'")]
    UnknownState { state: String },

    #[error("Transition table declares unknown action '{action}' in state '{state}'")]
    UnknownAction { state: String, action: String },
}

/// Contract violations detected by [`Matcher`](super::Matcher).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MatchError {
    #[error("Match is not exhaustive, missing handlers for: {}", .missing.join(", "))]
    NonExhaustive { missing: Vec<&'static str> },

    #[error("Match declares a handler for unknown tag '{tag}'")]
    UnknownTag { tag: String },
}
