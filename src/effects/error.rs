//! Errors raised while declaring effects.

use thiserror::Error;

/// A transition pattern that cannot be used.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("Pattern '{pattern}' has {segments} segments, expected 'prev => action => next'")]
    Malformed { pattern: String, segments: usize },

    #[error("Pattern '{pattern}' has an empty segment")]
    EmptySegment { pattern: String },

    #[error("Pattern '{pattern}' names unknown state '{tag}'")]
    UnknownState { pattern: String, tag: String },

    #[error("Pattern '{pattern}' names unknown action '{tag}'")]
    UnknownAction { pattern: String, tag: String },

    #[error("Dwell set names unknown state '{tag}'")]
    UnknownDwellState { tag: String },

    #[error("Command effect names unknown command '{tag}'")]
    UnknownCommand { tag: String },
}
