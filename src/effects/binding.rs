//! The interface a machine uses to drive its effects.

use crate::core::Snapshot;

/// An effect bound to a machine.
///
/// The machine calls `render` after every commit, in bind order, and
/// `dispose` once when it is disposed.
pub trait Binding<S, A, C> {
    fn render(&mut self, snapshot: &Snapshot<S, A, C>);

    fn dispose(&mut self);
}
