//! Tagged variants: states, actions and commands.
//!
//! Every value that flows through a machine is a closed enum whose variants
//! carry a string tag. Tags are what transition labels, dwell sets and the
//! inspector talk about, so they must be unique within their enum.

use serde::Serialize;
use std::fmt::Debug;

/// A closed tagged union.
///
/// `TAGS` lists the complete tag domain; `tag` returns the tag of this value.
/// Implement it with the [`tagged!`](crate::tagged) macro rather than by hand.
///
/// # Example
///
/// ```rust
/// use statecraft::core::Tagged;
/// use statecraft::tagged;
///
/// #[derive(Debug)]
/// enum Light {
///     Red,
///     Green { since: u64 },
/// }
///
/// tagged!(Light {
///     Red => "RED",
///     Green => "GREEN",
/// });
///
/// assert_eq!(Light::Green { since: 3 }.tag(), "GREEN");
/// assert_eq!(Light::TAGS, &["RED", "GREEN"]);
/// ```
pub trait Tagged {
    /// Every tag this type can produce, in declaration order.
    const TAGS: &'static [&'static str];

    /// The discriminant of this value.
    fn tag(&self) -> &'static str;

    /// Check whether `tag` belongs to this type's domain.
    fn has_tag(tag: &str) -> bool {
        Self::TAGS.contains(&tag)
    }
}

/// One discrete mode of a component's behavior.
///
/// States are immutable; a machine hands them out behind `Rc` and uses
/// pointer identity, never `PartialEq`, to decide whether anything changed.
pub trait State: Tagged + Debug + Serialize {}

/// An event that may trigger a transition.
pub trait Action: Tagged + Debug + Serialize {}

/// A one-shot side-effect request emitted by a transition.
///
/// Commands live on the transition record, never inside a state.
pub trait Command: Tagged + Debug + Serialize {}

/// Command type for machines that never emit commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoCommand {}

impl Tagged for NoCommand {
    const TAGS: &'static [&'static str] = &[];

    fn tag(&self) -> &'static str {
        match *self {}
    }
}

impl Command for NoCommand {}
