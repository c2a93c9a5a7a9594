//! Introspection descriptor for a transition table.

use super::error::TableError;
use crate::core::Tagged;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use stillwater::validation::Validation;

/// Which action types each state tag handles.
///
/// This is a description of a [`Transitions`](super::Transitions)
/// implementation, not the implementation itself. It travels to the inspector
/// inside `state` and `transitions` messages and serializes as
/// `{"<state>": ["<action>", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionTable {
    entries: BTreeMap<String, Vec<String>>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that `state` handles each of `actions`.
    ///
    /// Repeated declarations for the same state are merged.
    pub fn on<'a>(mut self, state: &str, actions: impl IntoIterator<Item = &'a str>) -> Self {
        let handled = self.entries.entry(state.to_string()).or_default();
        for action in actions {
            if !handled.iter().any(|a| a == action) {
                handled.push(action.to_string());
            }
        }
        self
    }

    /// Check whether `(state, action)` has a handler.
    pub fn handles(&self, state: &str, action: &str) -> bool {
        self.entries
            .get(state)
            .is_some_and(|actions| actions.iter().any(|a| a == action))
    }

    /// Action types handled in `state`.
    pub fn actions(&self, state: &str) -> &[String] {
        self.entries.get(state).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check every declared tag against the state and action domains.
    ///
    /// All problems are reported together.
    pub fn validate<S: Tagged, A: Tagged>(&self) -> Validation<(), Vec<TableError>> {
        let mut errors = Vec::new();

        for (state, actions) in &self.entries {
            if !S::has_tag(state) {
                errors.push(TableError::UnknownState {
                    state: state.clone(),
                });
            }
            for action in actions {
                if !A::has_tag(action) {
                    errors.push(TableError::UnknownAction {
                        state: state.clone(),
                        action: action.clone(),
                    });
                }
            }
        }

        if errors.is_empty() {
            Validation::Success(())
        } else {
            Validation::Failure(errors)
        }
    }
}
