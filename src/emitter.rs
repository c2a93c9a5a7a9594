//! Synchronous publish/subscribe channel.
//!
//! An [`Emitter`] decouples side-effectful collaborators (network, storage,
//! timers) from a machine's action stream: the environment emits events, a
//! subscriber set up inside an effect turns them into dispatched actions.
//! Delivery is synchronous and in subscription order; there is no buffering.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Listener<E> = Rc<dyn Fn(&E)>;

struct Listeners<E> {
    next_id: u64,
    entries: Vec<(u64, Listener<E>)>,
}

impl<E> Listeners<E> {
    fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|(i, _)| *i == id)
    }
}

/// Cloneable handle to a listener set. Clones share the same listeners.
pub struct Emitter<E> {
    listeners: Rc<RefCell<Listeners<E>>>,
}

impl<E: 'static> Emitter<E> {
    pub fn new() -> Self {
        Self {
            listeners: Rc::new(RefCell::new(Listeners {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Deliver `event` to every listener subscribed when the call starts.
    ///
    /// Listeners removed by an earlier listener during this call are skipped;
    /// listeners added during this call first hear the next event.
    pub fn emit(&self, event: E) {
        let snapshot: Vec<(u64, Listener<E>)> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(id, listener)| (*id, Rc::clone(listener)))
            .collect();

        tracing::trace!(listeners = snapshot.len(), "emit");
        for (id, listener) in snapshot {
            if self.listeners.borrow().contains(id) {
                listener(&event);
            }
        }
    }

    /// Register `listener`. The returned [`Subscription`] removes exactly this
    /// registration, even when the same closure is subscribed twice.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&E) + 'static,
    {
        let id = {
            let mut listeners = self.listeners.borrow_mut();
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.entries.push((id, Rc::new(listener)));
            id
        };

        let weak: Weak<RefCell<Listeners<E>>> = Rc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = weak.upgrade() {
                listeners.borrow_mut().entries.retain(|(i, _)| *i != id);
            }
        })
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }
}

impl<E: 'static> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for Emitter<E> {
    fn clone(&self) -> Self {
        Self {
            listeners: Rc::clone(&self.listeners),
        }
    }
}

impl<E> fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listeners.borrow().entries.len())
            .finish()
    }
}

/// Handle returned by [`Emitter::subscribe`].
///
/// Dropping it does not unsubscribe; call [`unsubscribe`](Self::unsubscribe).
pub struct Subscription {
    remove: Cell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    fn new(remove: impl FnOnce() + 'static) -> Self {
        Self {
            remove: Cell::new(Some(Box::new(remove))),
        }
    }

    /// Remove the listener. Calling this more than once has no effect.
    pub fn unsubscribe(&self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }

    pub fn is_active(&self) -> bool {
        // Cell<Option<Box<..>>> cannot be peeked, so swap it out and back.
        let remove = self.remove.take();
        let active = remove.is_some();
        self.remove.set(remove);
        active
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
