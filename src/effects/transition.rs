//! Effects keyed on transitions, and the identity guard they share.

use super::binding::Binding;
use super::error::PatternError;
use super::pattern::TransitionPattern;
use crate::core::{Snapshot, Tagged, TransitionRecord};
use std::rc::Rc;
use stillwater::validation::Validation;

/// Remembers the last state reference a binding has seen.
///
/// The first render only records a baseline; later renders report the
/// transition record when, and only when, the state reference changed.
pub(crate) struct Tracker<S> {
    seen: Option<Rc<S>>,
}

impl<S> Tracker<S> {
    pub(crate) fn new() -> Self {
        Self { seen: None }
    }

    pub(crate) fn advance<'s, A, C>(
        &mut self,
        snapshot: &'s Snapshot<S, A, C>,
    ) -> Option<&'s TransitionRecord<S, A, C>> {
        let mounted = match &self.seen {
            Some(seen) if Rc::ptr_eq(seen, snapshot.state_rc()) => return None,
            Some(_) => true,
            None => false,
        };
        self.seen = Some(Rc::clone(snapshot.state_rc()));
        if mounted {
            snapshot.record()
        } else {
            None
        }
    }

    pub(crate) fn reset(&mut self) {
        self.seen = None;
    }
}

type TransitionCallback<S, A> = Box<dyn FnMut(&S, &A, &S)>;

/// Run a callback for transitions, `useTransitionEffect` style.
///
/// Without patterns the callback runs on every render where the state
/// reference changed; with patterns only when the transition label matches
/// at least one of them. The callback receives `(prev, action, current)`.
pub struct TransitionEffect<S, A> {
    patterns: Option<Vec<TransitionPattern>>,
    effect: TransitionCallback<S, A>,
    tracker: Tracker<S>,
}

impl<S: Tagged, A: Tagged> TransitionEffect<S, A> {
    /// Fire on every transition.
    pub fn any<F>(effect: F) -> Self
    where
        F: FnMut(&S, &A, &S) + 'static,
    {
        Self {
            patterns: None,
            effect: Box::new(effect),
            tracker: Tracker::new(),
        }
    }

    /// Fire on transitions matching one of `patterns`.
    ///
    /// Patterns are checked against the state and action domains; every
    /// problem is returned at once.
    pub fn matching<'p, F>(
        patterns: impl IntoIterator<Item = &'p str>,
        effect: F,
    ) -> Result<Self, Vec<PatternError>>
    where
        F: FnMut(&S, &A, &S) + 'static,
    {
        match TransitionPattern::parse_all_for::<S, A>(patterns) {
            Validation::Success(patterns) => Ok(Self::with_patterns(patterns, effect)),
            Validation::Failure(errors) => Err(errors),
        }
    }

    /// Fire on transitions matching one of the already parsed `patterns`.
    pub fn with_patterns<F>(patterns: Vec<TransitionPattern>, effect: F) -> Self
    where
        F: FnMut(&S, &A, &S) + 'static,
    {
        Self {
            patterns: Some(patterns),
            effect: Box::new(effect),
            tracker: Tracker::new(),
        }
    }

    /// Observe `snapshot`; fires at most once per transition.
    pub fn render<C>(&mut self, snapshot: &Snapshot<S, A, C>) {
        let Some(record) = self.tracker.advance(snapshot) else {
            return;
        };
        let current = snapshot.state();
        let wanted = self.patterns.as_ref().map_or(true, |patterns| {
            patterns
                .iter()
                .any(|p| p.matches(record.prev().tag(), record.action().tag(), current.tag()))
        });
        if wanted {
            tracing::trace!(transition = record.label(), "transition effect");
            (self.effect)(record.prev(), record.action(), current);
        }
    }

    /// Forget the last seen state; the next render is treated as a mount.
    pub fn dispose(&mut self) {
        self.tracker.reset();
    }
}

impl<S: Tagged, A: Tagged, C> Binding<S, A, C> for TransitionEffect<S, A> {
    fn render(&mut self, snapshot: &Snapshot<S, A, C>) {
        TransitionEffect::render(self, snapshot);
    }

    fn dispose(&mut self) {
        TransitionEffect::dispose(self);
    }
}
