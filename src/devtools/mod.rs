//! Devtools channel.
//!
//! A machine built with a [`Manager`] mounts under a string id and reports:
//!
//! - a `state` message on mount and whenever its state reference changes,
//!   carrying the transition table
//! - a `dispatch` message for every dispatched action, flagged `ignored`
//! - a `command` message whenever a transition emits a command
//! - a `transitions` message whenever the manager calls the replay hook it
//!   received on mount
//!
//! On dispose the machine unmounts. Without a manager nothing is serialized
//! and nothing is sent.

mod bridge;
mod inspector;
mod manager;
mod message;

pub(crate) use bridge::{Bridge, ACTION_KEY};
pub use inspector::{Inspector, InspectorConfig};
pub use manager::{Manager, Replay};
pub use message::{Envelope, Message};
