//! Builder for machine instances.

use crate::builder::error::BuildError;
use crate::core::Snapshot;
use crate::devtools::{Bridge, Manager};
use crate::engine::Transitions;
use crate::machine::Machine;
use std::rc::Rc;
use stillwater::validation::Validation;
use uuid::Uuid;

/// Builder for a [`Machine`] with a fluent API.
pub struct MachineBuilder<T: Transitions> {
    table: T,
    initial: Option<T::State>,
    id: Option<String>,
    manager: Option<Rc<dyn Manager>>,
}

impl<T: Transitions + 'static> MachineBuilder<T> {
    /// Create a builder for machines driven by `table`.
    pub fn new(table: T) -> Self {
        Self {
            table,
            initial: None,
            id: None,
            manager: None,
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: T::State) -> Self {
        self.initial = Some(state);
        self
    }

    /// Set a stable id. Defaults to a random UUID when devtools are attached.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Report to `manager`.
    pub fn devtools(mut self, manager: Rc<dyn Manager>) -> Self {
        self.manager = Some(manager);
        self
    }

    /// Build and mount the machine.
    ///
    /// Fails when the initial state is missing, the id is empty or the
    /// transition table names tags outside the state and action domains.
    pub fn build(self) -> Result<Machine<T>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        let transitions = self.table.table();
        if let Validation::Failure(errors) = transitions.validate::<T::State, T::Action>() {
            return Err(BuildError::InvalidTable(errors));
        }

        let id: Option<Rc<str>> = match (self.id, &self.manager) {
            (Some(id), _) if id.is_empty() => return Err(BuildError::EmptyId),
            (Some(id), _) => Some(id.into()),
            (None, Some(_)) => Some(Uuid::new_v4().to_string().into()),
            (None, None) => None,
        };

        let mut snapshot = Snapshot::initial(initial);
        if let Some(id) = &id {
            snapshot = snapshot.with_machine_id(Rc::clone(id));
        }
        let bridge = Bridge::new(id.unwrap_or_else(|| Rc::from("")), self.manager, transitions);

        Ok(Machine::start(self.table, snapshot, bridge))
    }
}
