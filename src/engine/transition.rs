//! The pure transition step.

use super::table::TransitionTable;
use crate::core::{label, Action, Command, Snapshot, State, Tagged, TransitionRecord};
use std::rc::Rc;

/// Outcome of a transition handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Step<S, C> {
    /// Keep the current state reference. This is how "no handler" is spelled.
    Ignored,

    /// Move to a new state.
    To(S),

    /// Move to a new state and emit a one-shot command.
    Emit(S, C),
}

impl<S, C> Step<S, C> {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }
}

/// A machine's transition table.
///
/// `transition` is an exhaustive `match` over `(state, action)`; every pair
/// without a meaningful handler falls through to [`Step::Ignored`]. It must be
/// pure: no I/O, no interior mutation, same output for the same input.
///
/// `table` describes which `(state, action)` pairs have handlers so that the
/// inspector can display and replay the machine.
pub trait Transitions {
    type State: State;
    type Action: Action;
    type Command: Command;

    fn transition(
        &self,
        state: &Self::State,
        action: &Self::Action,
    ) -> Step<Self::State, Self::Command>;

    fn table(&self) -> TransitionTable;
}

/// Snapshot type produced by a transition table.
pub type SnapshotOf<T> = Snapshot<
    <T as Transitions>::State,
    <T as Transitions>::Action,
    <T as Transitions>::Command,
>;

/// Result of [`transition`].
pub struct Transitioned<S, A, C> {
    pub snapshot: Snapshot<S, A, C>,
    /// `true` when the state reference did not change.
    pub ignored: bool,
}

/// Compute the snapshot that follows `snapshot` when `action` is applied.
///
/// Never fails. An unhandled pair returns a clone of `snapshot` sharing the
/// same state reference and reports `ignored`. A handled pair produces a fresh
/// state carrying a [`TransitionRecord`] with the previous state, the action,
/// the label and the emitted command.
pub fn transition<T: Transitions>(
    snapshot: &SnapshotOf<T>,
    action: T::Action,
    table: &T,
) -> Transitioned<T::State, T::Action, T::Command> {
    let current = snapshot.state();
    let (next, command) = match table.transition(current, &action) {
        Step::Ignored => {
            tracing::debug!(
                machine = snapshot.machine_id().unwrap_or("-"),
                state = current.tag(),
                action = action.tag(),
                ignored = true,
                "transition ignored"
            );
            return Transitioned {
                snapshot: snapshot.clone(),
                ignored: true,
            };
        }
        Step::To(next) => (next, None),
        Step::Emit(next, command) => (next, Some(command)),
    };

    let label = label(current.tag(), action.tag(), next.tag());
    tracing::debug!(
        machine = snapshot.machine_id().unwrap_or("-"),
        transition = %label,
        command = command.as_ref().map(|c| c.tag()),
        "transition"
    );

    let record = TransitionRecord {
        seq: snapshot.next_seq(),
        prev: Rc::clone(snapshot.state_rc()),
        action: Rc::new(action),
        label,
        command,
    };
    Transitioned {
        snapshot: snapshot.advance(Rc::new(next), record),
        ignored: false,
    }
}
