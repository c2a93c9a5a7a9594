//! A running machine: the state/dispatch pair a component holds.
//!
//! [`Machine`] owns the current [`Snapshot`], the effects bound to it and the
//! devtools link. Dispatch applies one pure [`transition`], reports to the
//! manager, then renders every binding in bind order. Effects that dispatch
//! while bindings render are queued and applied once the pass finishes, so
//! every binding observes every committed state in order.

use crate::core::{Snapshot, Tagged};
use crate::devtools::{Bridge, ACTION_KEY};
use crate::effects::Binding;
use crate::engine::{transition, SnapshotOf, Transitions};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::mem;
use std::rc::{Rc, Weak};

type BoxedBinding<T> = Box<
    dyn Binding<
        <T as Transitions>::State,
        <T as Transitions>::Action,
        <T as Transitions>::Command,
    >,
>;

/// Outcome of a dispatch.
pub struct Dispatched<S, A, C> {
    /// The machine's snapshot after the dispatch.
    pub snapshot: Snapshot<S, A, C>,
    /// `true` when the state reference did not change.
    pub ignored: bool,
    /// `true` when the action was queued behind a running render pass.
    /// `snapshot` is then the state before the action.
    pub deferred: bool,
}

impl<S, A, C> Dispatched<S, A, C> {
    /// Command emitted by this dispatch.
    pub fn command(&self) -> Option<&C> {
        if self.ignored || self.deferred {
            None
        } else {
            self.snapshot.command()
        }
    }
}

impl<S: fmt::Debug, A: fmt::Debug, C: fmt::Debug> fmt::Debug for Dispatched<S, A, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatched")
            .field("snapshot", &self.snapshot)
            .field("ignored", &self.ignored)
            .field("deferred", &self.deferred)
            .finish()
    }
}

/// [`Dispatched`] for a transition table.
pub type DispatchedOf<T> = Dispatched<
    <T as Transitions>::State,
    <T as Transitions>::Action,
    <T as Transitions>::Command,
>;

struct Inner<T: Transitions> {
    table: T,
    snapshot: SnapshotOf<T>,
    bindings: Vec<BoxedBinding<T>>,
    bridge: Bridge,
    queue: VecDeque<T::Action>,
    committing: bool,
    disposed: bool,
}

type Shared<T> = Rc<RefCell<Inner<T>>>;

/// A machine instance.
///
/// Build one with [`MachineBuilder`](crate::builder::MachineBuilder). Call
/// [`dispose`](Self::dispose) on unmount; dropping the machine does the same.
pub struct Machine<T: Transitions> {
    id: Option<Rc<str>>,
    inner: Shared<T>,
}

impl<T: Transitions + 'static> Machine<T> {
    pub(crate) fn start(table: T, snapshot: SnapshotOf<T>, bridge: Bridge) -> Self {
        let id = snapshot.machine_id().map(Rc::from);
        bridge.mount();
        bridge.state(snapshot.state(), None);
        tracing::debug!(
            machine = id.as_deref().unwrap_or("-"),
            state = snapshot.tag(),
            devtools = bridge.is_attached(),
            "machine started"
        );
        Self {
            id,
            inner: Rc::new(RefCell::new(Inner {
                table,
                snapshot,
                bindings: Vec::new(),
                bridge,
                queue: VecDeque::new(),
                committing: false,
                disposed: false,
            })),
        }
    }

    /// Stable id, if one was given or devtools are attached.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> SnapshotOf<T> {
        self.inner.borrow().snapshot.clone()
    }

    pub fn state(&self) -> Rc<T::State> {
        Rc::clone(self.inner.borrow().snapshot.state_rc())
    }

    /// Apply `action`, report it and render the bindings.
    pub fn dispatch(&self, action: T::Action) -> DispatchedOf<T> {
        dispatch(&self.inner, action)
    }

    /// A handle that can dispatch into this machine from effects and
    /// environment listeners without keeping it alive.
    pub fn dispatcher(&self) -> Dispatcher<T> {
        Dispatcher {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Attach an effect. It renders the current snapshot right away as its
    /// mount, then again after every committed transition.
    pub fn bind<B>(&mut self, binding: B)
    where
        B: Binding<T::State, T::Action, T::Command> + 'static,
    {
        let mut binding: BoxedBinding<T> = Box::new(binding);
        let snapshot = {
            let mut inner = self.inner.borrow_mut();
            inner.committing = true;
            inner.snapshot.clone()
        };
        binding.render(&snapshot);
        {
            let mut inner = self.inner.borrow_mut();
            inner.bindings.push(binding);
            inner.committing = false;
        }
        drain(&self.inner);
    }

    /// Number of attached bindings.
    pub fn bindings(&self) -> usize {
        self.inner.borrow().bindings.len()
    }

    /// Render every binding with the current snapshot, as a host re-render
    /// would. Nothing fires unless the state changed since the last pass.
    pub fn render(&self) {
        if begin(&self.inner) {
            render(&self.inner);
            end(&self.inner);
            drain(&self.inner);
        }
    }

    /// Send the transition table to the manager again.
    pub fn request_transitions(&self) {
        let bridge = self.inner.borrow().bridge.clone();
        bridge.transitions();
    }

    /// Dispose every binding in bind order, then unmount from the manager.
    pub fn dispose(self) {
        shutdown(&self.inner);
    }
}

impl<T: Transitions> Drop for Machine<T> {
    fn drop(&mut self) {
        shutdown(&self.inner);
    }
}

impl<T: Transitions> fmt::Debug for Machine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Machine")
            .field("id", &self.id)
            .field("state", inner.snapshot.state())
            .field("bindings", &inner.bindings.len())
            .field("disposed", &inner.disposed)
            .finish()
    }
}

/// Weak dispatch handle.
pub struct Dispatcher<T: Transitions> {
    inner: Weak<RefCell<Inner<T>>>,
}

impl<T: Transitions + 'static> Dispatcher<T> {
    /// Dispatch into the machine. `None` once the machine is gone.
    pub fn dispatch(&self, action: T::Action) -> Option<DispatchedOf<T>> {
        match self.inner.upgrade() {
            Some(inner) => Some(dispatch(&inner, action)),
            None => {
                tracing::warn!(action = action.tag(), "dispatch to a dropped machine ignored");
                None
            }
        }
    }

    /// Whether the machine is still alive and not disposed.
    pub fn is_live(&self) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| !inner.borrow().disposed)
    }
}

impl<T: Transitions> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T: Transitions> fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("live", &(self.inner.strong_count() > 0))
            .finish()
    }
}

fn dispatch<T: Transitions>(inner: &Shared<T>, action: T::Action) -> DispatchedOf<T> {
    {
        let mut machine = inner.borrow_mut();
        if machine.disposed {
            tracing::warn!(
                machine = machine.snapshot.machine_id().unwrap_or("-"),
                action = action.tag(),
                "dispatch after dispose ignored"
            );
            return Dispatched {
                snapshot: machine.snapshot.clone(),
                ignored: true,
                deferred: false,
            };
        }
        if machine.committing {
            tracing::trace!(action = action.tag(), "dispatch deferred until render completes");
            machine.queue.push_back(action);
            return Dispatched {
                snapshot: machine.snapshot.clone(),
                ignored: false,
                deferred: true,
            };
        }
        machine.committing = true;
    }

    let outcome = apply(inner, action);
    if !outcome.ignored {
        render(inner);
    }
    end(inner);
    drain(inner);
    outcome
}

/// Apply queued actions until the queue is empty.
fn drain<T: Transitions>(inner: &Shared<T>) {
    loop {
        let next = {
            let mut machine = inner.borrow_mut();
            if machine.committing || machine.disposed {
                return;
            }
            let Some(next) = machine.queue.pop_front() else {
                return;
            };
            machine.committing = true;
            next
        };
        if !apply(inner, next).ignored {
            render(inner);
        }
        end(inner);
    }
}

/// Mark a render pass as running; `false` when one already is.
fn begin<T: Transitions>(inner: &Shared<T>) -> bool {
    let mut machine = inner.borrow_mut();
    if machine.committing || machine.disposed {
        return false;
    }
    machine.committing = true;
    true
}

fn end<T: Transitions>(inner: &Shared<T>) {
    inner.borrow_mut().committing = false;
}

/// Run one transition and report it. No borrow is held while the manager
/// runs.
fn apply<T: Transitions>(inner: &Shared<T>, action: T::Action) -> DispatchedOf<T> {
    let (bridge, encoded, outcome) = {
        let mut machine = inner.borrow_mut();
        let bridge = machine.bridge.clone();
        let encoded = bridge.encode(ACTION_KEY, &action);
        let outcome = transition(&machine.snapshot, action, &machine.table);
        machine.snapshot = outcome.snapshot.clone();
        (bridge, encoded, outcome)
    };

    bridge.dispatch(encoded, outcome.ignored);
    if !outcome.ignored {
        let snapshot = &outcome.snapshot;
        bridge.state(snapshot.state(), snapshot.label());
        if let Some(command) = snapshot.command() {
            bridge.command(command);
        }
    }
    Dispatched {
        snapshot: outcome.snapshot,
        ignored: outcome.ignored,
        deferred: false,
    }
}

/// Render every binding with the current snapshot, in bind order.
///
/// An effect may dispose the machine mid-pass. The remaining bindings are
/// then skipped and every binding of the pass is disposed here, since
/// `shutdown` found the binding list empty.
fn render<T: Transitions>(inner: &Shared<T>) {
    let (snapshot, mut bindings) = {
        let mut machine = inner.borrow_mut();
        let bindings = mem::take(&mut machine.bindings);
        (machine.snapshot.clone(), bindings)
    };
    for binding in &mut bindings {
        if inner.borrow().disposed {
            break;
        }
        binding.render(&snapshot);
    }
    let mut machine = inner.borrow_mut();
    bindings.append(&mut machine.bindings);
    if machine.disposed {
        drop(machine);
        tracing::debug!("machine disposed during render, disposing its bindings");
        for binding in &mut bindings {
            binding.dispose();
        }
    } else {
        machine.bindings = bindings;
    }
}

fn shutdown<T: Transitions>(inner: &Shared<T>) {
    let (bridge, mut bindings) = {
        let mut machine = inner.borrow_mut();
        if machine.disposed {
            return;
        }
        machine.disposed = true;
        machine.queue.clear();
        (machine.bridge.clone(), mem::take(&mut machine.bindings))
    };
    for binding in &mut bindings {
        binding.dispose();
    }
    bridge.unmount();
    tracing::debug!(
        machine = inner.borrow().snapshot.machine_id().unwrap_or("-"),
        "machine disposed"
    );
}
