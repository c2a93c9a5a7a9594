//! Core value types.
//!
//! This module contains the vocabulary shared by every other layer:
//! - Tagged variants via the `Tagged` trait and the `State`/`Action`/`Command` markers
//! - State envelopes (`Snapshot`) with out-of-band transition records
//!
//! Nothing here performs side effects.

mod snapshot;
mod state;

pub use snapshot::{label, Snapshot, TransitionRecord, LABEL_SEPARATOR};
pub use state::{Action, Command, NoCommand, State, Tagged};
