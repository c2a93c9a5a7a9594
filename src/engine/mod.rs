//! The transition engine.
//!
//! A machine's behavior is a [`Transitions`] implementation: an exhaustive
//! `match` over `(state, action)` returning a [`Step`]. [`transition`] runs
//! one step and wraps the result in a [`Snapshot`](crate::core::Snapshot)
//! carrying its debug record. Everything here is pure and synchronous; the
//! only observable side channel is `tracing` output.

mod error;
mod matcher;
mod table;
mod transition;

pub use error::{MatchError, TableError};
pub use matcher::{match_prop, match_state, Matcher, PropMatch};
pub use table::TransitionTable;
pub use transition::{transition, SnapshotOf, Step, Transitioned, Transitions};
