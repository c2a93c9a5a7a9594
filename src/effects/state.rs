//! Effects scoped to a dwell inside a set of states.
//!
//! Unlike transition and command effects this one does not use the
//! transition tracker: it compares set membership between renders through an
//! [`EffectSlot`], which is what makes batched transitions a single crossing.

use super::binding::Binding;
use super::error::PatternError;
use super::slot::{Cleanup, EffectSlot};
use crate::core::{Snapshot, Tagged};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

type EnterCallback<S> = Box<dyn FnMut(&S) -> Option<Cleanup>>;

/// Shared handle to a [`StateEffect`]'s dependencies.
///
/// It stays usable after the effect is bound to a
/// [`Machine`](crate::machine::Machine). New dependencies are picked up by
/// the next render, so follow [`set`](Self::set) with `Machine::render`.
pub struct Deps<D>(Rc<RefCell<D>>);

impl<D: Clone> Deps<D> {
    pub fn get(&self) -> D {
        self.0.borrow().clone()
    }

    pub fn set(&self, deps: D) {
        *self.0.borrow_mut() = deps;
    }
}

impl<D> Clone for Deps<D> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<D: fmt::Debug> fmt::Debug for Deps<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Deps").field(&self.0.borrow()).finish()
    }
}

/// Run an effect while the machine dwells in a set of states.
///
/// The effect runs once when the machine enters the set and its cleanup runs
/// once when the machine leaves it, when the dependencies change, or on
/// dispose. Moving between two states of the same set is not observable.
///
/// Membership is compared against the previous render, so several
/// transitions between two renders count as a single boundary crossing.
pub struct StateEffect<S, D = ()> {
    tags: Vec<&'static str>,
    effect: EnterCallback<S>,
    deps: Deps<D>,
    slot: EffectSlot<(bool, D)>,
}

impl<S: Tagged> StateEffect<S> {
    /// Effect without extra dependencies.
    pub fn new<F>(
        tags: impl IntoIterator<Item = &'static str>,
        effect: F,
    ) -> Result<Self, PatternError>
    where
        F: FnMut(&S) -> Option<Cleanup> + 'static,
    {
        Self::with_deps(tags, (), effect)
    }
}

impl<S: Tagged, D: Clone + PartialEq> StateEffect<S, D> {
    /// Effect that also restarts when `deps` change while inside the set.
    pub fn with_deps<F>(
        tags: impl IntoIterator<Item = &'static str>,
        deps: D,
        effect: F,
    ) -> Result<Self, PatternError>
    where
        F: FnMut(&S) -> Option<Cleanup> + 'static,
    {
        let tags: Vec<&'static str> = tags.into_iter().collect();
        if let Some(tag) = tags.iter().find(|tag| !S::has_tag(tag)) {
            return Err(PatternError::UnknownDwellState {
                tag: (*tag).to_string(),
            });
        }
        Ok(Self {
            tags,
            effect: Box::new(effect),
            deps: Deps(Rc::new(RefCell::new(deps))),
            slot: EffectSlot::new(),
        })
    }

    /// Handle for changing the dependencies later.
    pub fn deps(&self) -> Deps<D> {
        self.deps.clone()
    }

    pub fn tags(&self) -> &[&'static str] {
        &self.tags
    }

    /// Whether the effect is currently mounted, i.e. the last render was
    /// inside the set.
    pub fn is_inside(&self) -> bool {
        self.slot.deps().is_some_and(|(inside, _)| *inside)
    }

    /// Observe `snapshot` with the current dependencies.
    pub fn render<A, C>(&mut self, snapshot: &Snapshot<S, A, C>) {
        let deps = self.deps.get();
        self.render_with(snapshot, deps);
    }

    /// Observe `snapshot` with new dependencies.
    pub fn render_with<A, C>(&mut self, snapshot: &Snapshot<S, A, C>, deps: D) {
        let inside = self.tags.contains(&snapshot.tag());
        let was_inside = self.is_inside();
        self.deps.set(deps.clone());

        let effect = &mut self.effect;
        let tags = &self.tags;
        let ran = self.slot.run((inside, deps), || {
            if inside {
                tracing::trace!(state = snapshot.tag(), ?tags, "dwell effect entered");
                effect(snapshot.state())
            } else {
                None
            }
        });
        if ran && was_inside && !inside {
            tracing::trace!(state = snapshot.tag(), ?tags, "dwell effect left");
        }
    }

    /// Run the pending cleanup, as on unmount.
    pub fn dispose(&mut self) {
        self.slot.dispose();
    }
}

impl<S: Tagged, A, C, D: Clone + PartialEq> Binding<S, A, C> for StateEffect<S, D> {
    fn render(&mut self, snapshot: &Snapshot<S, A, C>) {
        StateEffect::render(self, snapshot);
    }

    fn dispose(&mut self) {
        StateEffect::dispose(self);
    }
}
