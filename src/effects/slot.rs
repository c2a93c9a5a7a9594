//! Commit-phase effect slot with dependency tracking.

use crate::emitter::Subscription;
use std::fmt;

/// Teardown returned by an effect.
pub struct Cleanup(Box<dyn FnOnce()>);

impl Cleanup {
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self(Box::new(teardown))
    }

    pub fn run(self) {
        (self.0)()
    }
}

impl From<Subscription> for Cleanup {
    fn from(subscription: Subscription) -> Self {
        Cleanup::new(move || subscription.unsubscribe())
    }
}

impl fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Cleanup")
    }
}

/// One `useEffect` call site.
///
/// [`run`](Self::run) executes the effect on the first call and whenever
/// `deps` differ (by `PartialEq`) from the previous call, running the previous
/// cleanup first. [`dispose`](Self::dispose) runs the pending cleanup and
/// forgets the dependencies.
pub struct EffectSlot<D> {
    deps: Option<D>,
    cleanup: Option<Cleanup>,
}

impl<D: PartialEq> EffectSlot<D> {
    pub fn new() -> Self {
        Self {
            deps: None,
            cleanup: None,
        }
    }

    /// Returns `true` when the effect ran.
    pub fn run<F>(&mut self, deps: D, effect: F) -> bool
    where
        F: FnOnce() -> Option<Cleanup>,
    {
        if self.deps.as_ref() == Some(&deps) {
            return false;
        }
        if let Some(cleanup) = self.cleanup.take() {
            cleanup.run();
        }
        self.deps = Some(deps);
        self.cleanup = effect();
        true
    }

    pub fn dispose(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup.run();
        }
        self.deps = None;
    }

    pub fn has_cleanup(&self) -> bool {
        self.cleanup.is_some()
    }

    /// Dependencies of the last run; `None` before the first run or after dispose.
    pub fn deps(&self) -> Option<&D> {
        self.deps.as_ref()
    }
}

impl<D: PartialEq> Default for EffectSlot<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: fmt::Debug> fmt::Debug for EffectSlot<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectSlot")
            .field("deps", &self.deps)
            .field("has_cleanup", &self.cleanup.is_some())
            .finish()
    }
}
