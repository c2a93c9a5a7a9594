//! The effect binder.
//!
//! Effects never run inside a transition. They run after a commit, when the
//! host (or a [`Machine`](crate::machine::Machine)) renders a snapshot:
//!
//! - [`TransitionEffect`]: fires once per transition, optionally filtered by
//!   `"prev => action => next"` patterns
//! - [`CommandEffect`]: delivers a one-shot command exactly once
//! - [`StateEffect`]: mounts on entering a set of states, cleans up on leaving
//!
//! [`EffectSlot`] is the dependency-tracking primitive underneath, the
//! equivalent of a UI framework's post-commit effect hook.

mod binding;
mod command;
mod error;
mod pattern;
mod slot;
mod state;
mod transition;

pub use binding::Binding;
pub use command::CommandEffect;
pub use error::PatternError;
pub use pattern::TransitionPattern;
pub use slot::{Cleanup, EffectSlot};
pub use state::{Deps, StateEffect};
pub use transition::TransitionEffect;
