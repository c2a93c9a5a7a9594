//! Build errors for machines.

use crate::engine::TableError;
use thiserror::Error;

/// Errors that can occur when building a machine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("Machine id is empty. Pass a non-empty id or omit .id()")]
    EmptyId,

    #[error("Transition table is invalid: {}", join(.0))]
    InvalidTable(Vec<TableError>),
}

fn join(errors: &[TableError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
