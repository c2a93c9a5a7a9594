//! Branching on state shape.
//!
//! [`match_state`] dispatches on a state's tag with either an exhaustive set
//! of handlers or a fallback. [`match_prop`] looks up a payload field by name
//! through the state's serialized form, for fields shared by several tags.

use super::error::MatchError;
use crate::core::Tagged;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

type Arm<'a, S, R> = Box<dyn FnOnce(&'a S) -> R + 'a>;

/// Builder returned by [`match_state`].
pub struct Matcher<'a, S, R> {
    state: &'a S,
    arms: Vec<(&'static str, Arm<'a, S, R>)>,
}

/// Start matching on `state`'s tag.
///
/// # Example
///
/// ```rust
/// use statecraft::engine::match_state;
/// use statecraft::tagged;
///
/// #[derive(Debug)]
/// enum Fetch {
///     Idle,
///     Loaded { count: usize },
/// }
///
/// tagged!(Fetch {
///     Idle => "IDLE",
///     Loaded => "LOADED",
/// });
///
/// let state = Fetch::Loaded { count: 2 };
/// let text = match_state(&state)
///     .on("IDLE", |_| "nothing yet".to_string())
///     .on("LOADED", |s| match s {
///         Fetch::Loaded { count } => format!("{count} items"),
///         _ => unreachable!(),
///     })
///     .exhaustive();
///
/// assert_eq!(text, "2 items");
/// ```
pub fn match_state<S: Tagged, R>(state: &S) -> Matcher<'_, S, R> {
    Matcher {
        state,
        arms: Vec::new(),
    }
}

impl<'a, S: Tagged, R> Matcher<'a, S, R> {
    /// Handle `tag`. A later arm for the same tag replaces the earlier one.
    pub fn on<F>(mut self, tag: &'static str, handler: F) -> Self
    where
        F: FnOnce(&'a S) -> R + 'a,
    {
        self.arms.retain(|(t, _)| *t != tag);
        self.arms.push((tag, Box::new(handler)));
        self
    }

    /// Run the matching arm, or `fallback` when none matches.
    pub fn otherwise<F>(self, fallback: F) -> R
    where
        F: FnOnce(&'a S) -> R,
    {
        let state = self.state;
        match self.take_arm() {
            Some(arm) => arm(state),
            None => fallback(state),
        }
    }

    /// Run the matching arm after checking the arms cover every tag of `S`.
    pub fn try_exhaustive(self) -> Result<R, MatchError> {
        if let Some((tag, _)) = self.arms.iter().find(|(t, _)| !S::has_tag(t)) {
            return Err(MatchError::UnknownTag {
                tag: (*tag).to_string(),
            });
        }

        let missing: Vec<&'static str> = S::TAGS
            .iter()
            .copied()
            .filter(|tag| !self.arms.iter().any(|(t, _)| t == tag))
            .collect();
        if !missing.is_empty() {
            return Err(MatchError::NonExhaustive { missing });
        }

        let state = self.state;
        let tag = state.tag();
        self.take_arm()
            .map(|arm| arm(state))
            .ok_or(MatchError::NonExhaustive { missing: vec![tag] })
    }

    /// Run the matching arm of an exhaustive match.
    ///
    /// # Panics
    ///
    /// Panics when the arms do not cover every tag of `S`. Execution has no
    /// branch to continue with, so this is treated like an unreachable arm.
    pub fn exhaustive(self) -> R {
        match self.try_exhaustive() {
            Ok(result) => result,
            Err(err) => panic!("{err}"),
        }
    }

    fn take_arm(mut self) -> Option<Arm<'a, S, R>> {
        let tag = self.state.tag();
        let index = self.arms.iter().position(|(t, _)| *t == tag)?;
        Some(self.arms.swap_remove(index).1)
    }
}

/// A state known to carry a given payload field.
#[derive(Debug)]
pub struct PropMatch<'a, S> {
    state: &'a S,
    value: Value,
}

impl<'a, S> PropMatch<'a, S> {
    pub fn state(&self) -> &'a S {
        self.state
    }

    /// Serialized value of the field.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Decode the field into `T`; `None` when the shape does not fit.
    pub fn get<T: DeserializeOwned>(&self) -> Option<T> {
        T::deserialize(&self.value).ok()
    }
}

/// Look up `prop` on `state` regardless of its tag.
///
/// Works with internally tagged states (`#[serde(tag = "state")]`) and with
/// serde's default externally tagged layout. Returns `None` when the field is
/// absent or the state cannot be serialized; never fails.
///
/// A serialized form with a single key holding an object is read as an
/// externally tagged variant: only the payload is searched and the variant
/// name itself is never a match. A state that is a plain struct with exactly
/// one object-valued field is therefore not searchable by that field.
pub fn match_prop<'a, S: Serialize>(state: &'a S, prop: &str) -> Option<PropMatch<'a, S>> {
    let serialized = match serde_json::to_value(state) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(error = %err, prop, "state is not serializable, prop lookup skipped");
            return None;
        }
    };

    let Value::Object(mut fields) = serialized else {
        return None;
    };

    // Externally tagged: {"Variant": {..payload..}}
    if fields.len() == 1 && fields.values().all(Value::is_object) {
        let Some((_, Value::Object(mut payload))) = fields.into_iter().next() else {
            return None;
        };
        return payload
            .remove(prop)
            .map(|value| PropMatch { state, value });
    }

    fields.remove(prop).map(|value| PropMatch { state, value })
}
