//! State envelopes and out-of-band transition metadata.
//!
//! A [`Snapshot`] pairs the logical state with the record of the transition
//! that produced it. The record never leaks into the state value: serializing
//! a snapshot yields the state alone.

use super::state::Tagged;
use serde::{Serialize, Serializer};
use std::fmt;
use std::rc::Rc;

/// Separator between the three segments of a transition label.
pub const LABEL_SEPARATOR: &str = " => ";

/// Format the label `"<prev> => <action> => <next>"`.
pub fn label(prev: &str, action: &str, next: &str) -> String {
    format!("{prev}{LABEL_SEPARATOR}{action}{LABEL_SEPARATOR}{next}")
}

/// Debug metadata attached to a state produced by a transition.
pub struct TransitionRecord<S, A, C> {
    pub(crate) seq: u64,
    pub(crate) prev: Rc<S>,
    pub(crate) action: Rc<A>,
    pub(crate) label: String,
    pub(crate) command: Option<C>,
}

impl<S, A, C> TransitionRecord<S, A, C> {
    /// Position of this transition in the machine's lineage, starting at 1.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The state the transition started from.
    pub fn prev(&self) -> &S {
        &self.prev
    }

    /// Shared handle to the previous state.
    pub fn prev_rc(&self) -> &Rc<S> {
        &self.prev
    }

    /// The action that triggered the transition.
    pub fn action(&self) -> &A {
        &self.action
    }

    /// `"<prev> => <action> => <next>"`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Command emitted alongside the next state.
    pub fn command(&self) -> Option<&C> {
        self.command.as_ref()
    }
}

impl<S, A, C> fmt::Debug for TransitionRecord<S, A, C>
where
    S: fmt::Debug,
    A: fmt::Debug,
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionRecord")
            .field("seq", &self.seq)
            .field("label", &self.label)
            .field("action", &self.action)
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

/// A state value plus the record of how it was reached.
///
/// Cloning is cheap and preserves identity: two clones report
/// [`same_state`](Snapshot::same_state) as `true`.
pub struct Snapshot<S, A, C> {
    state: Rc<S>,
    record: Option<Rc<TransitionRecord<S, A, C>>>,
    machine_id: Option<Rc<str>>,
}

impl<S, A, C> Snapshot<S, A, C> {
    /// Snapshot of an initial state with no history.
    pub fn initial(state: S) -> Self {
        Self {
            state: Rc::new(state),
            record: None,
            machine_id: None,
        }
    }

    /// Tag this lineage with a stable machine identifier.
    ///
    /// Every snapshot derived from this one through a transition keeps it.
    pub fn with_machine_id(mut self, id: impl Into<Rc<str>>) -> Self {
        self.machine_id = Some(id.into());
        self
    }

    /// Snapshot reached from `self` through `record`.
    pub(crate) fn advance(&self, state: Rc<S>, record: TransitionRecord<S, A, C>) -> Self {
        Self {
            state,
            record: Some(Rc::new(record)),
            machine_id: self.machine_id.clone(),
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_rc(&self) -> &Rc<S> {
        &self.state
    }

    /// Transition metadata; `None` for the initial state.
    pub fn record(&self) -> Option<&TransitionRecord<S, A, C>> {
        self.record.as_deref()
    }

    /// Reference identity of the logical state.
    pub fn same_state(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    pub fn machine_id(&self) -> Option<&str> {
        self.machine_id.as_deref()
    }

    pub fn label(&self) -> Option<&str> {
        self.record().map(TransitionRecord::label)
    }

    pub fn command(&self) -> Option<&C> {
        self.record().and_then(TransitionRecord::command)
    }

    pub(crate) fn next_seq(&self) -> u64 {
        self.record.as_ref().map_or(1, |r| r.seq + 1)
    }
}

impl<S: Tagged, A, C> Snapshot<S, A, C> {
    /// Tag of the current state.
    pub fn tag(&self) -> &'static str {
        self.state.tag()
    }

    /// Check whether the current state carries `tag`.
    pub fn is(&self, tag: &str) -> bool {
        self.state.tag() == tag
    }
}

impl<S, A, C> Clone for Snapshot<S, A, C> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            record: self.record.clone(),
            machine_id: self.machine_id.clone(),
        }
    }
}

impl<S: fmt::Debug, A: fmt::Debug, C: fmt::Debug> fmt::Debug for Snapshot<S, A, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("state", &self.state)
            .field("record", &self.record)
            .field("machine_id", &self.machine_id)
            .finish()
    }
}

impl<S: Serialize, A, C> Serialize for Snapshot<S, A, C> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        self.state.serialize(serializer)
    }
}
