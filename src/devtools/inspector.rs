//! In-process devtools manager.

use super::manager::{Manager, Replay};
use super::message::{Envelope, Message};
use crate::emitter::{Emitter, Subscription};
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

/// Inspector settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectorConfig {
    /// Messages kept per machine; the oldest are dropped first.
    /// `None` keeps everything.
    pub max_messages: Option<usize>,

    /// Keep a machine's log after it unmounts, until [`Inspector::forget`].
    pub retain_unmounted: bool,
}

impl InspectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `n` messages per machine.
    pub fn max_messages(mut self, n: usize) -> Self {
        self.max_messages = Some(n);
        self
    }

    pub fn unbounded(mut self) -> Self {
        self.max_messages = None;
        self
    }

    pub fn retain_unmounted(mut self, retain: bool) -> Self {
        self.retain_unmounted = retain;
        self
    }
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            max_messages: Some(512),
            retain_unmounted: false,
        }
    }
}

#[derive(Default)]
struct Instance {
    replay: Option<Replay>,
    log: VecDeque<Envelope>,
}

/// A [`Manager`] that keeps a bounded message log per machine and streams
/// every envelope to subscribers.
///
/// A machine's log is released when it unmounts unless
/// [`InspectorConfig::retain_unmounted`] is set. Retained logs stay until
/// [`forget`](Inspector::forget); remounting under the same id appends to
/// them.
pub struct Inspector {
    config: InspectorConfig,
    instances: RefCell<BTreeMap<String, Instance>>,
    stream: Emitter<Envelope>,
}

impl Inspector {
    pub fn new() -> Self {
        Self::with_config(InspectorConfig::default())
    }

    pub fn with_config(config: InspectorConfig) -> Self {
        Self {
            config,
            instances: RefCell::new(BTreeMap::new()),
            stream: Emitter::new(),
        }
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    /// Receive every envelope as it is recorded.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Envelope) + 'static,
    {
        self.stream.subscribe(listener)
    }

    /// Ids of the machines currently mounted.
    pub fn instances(&self) -> Vec<String> {
        self.instances
            .borrow()
            .iter()
            .filter(|(_, instance)| instance.replay.is_some())
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn is_mounted(&self, id: &str) -> bool {
        self.instances
            .borrow()
            .get(id)
            .is_some_and(|instance| instance.replay.is_some())
    }

    /// Recorded messages for `id`, oldest first.
    pub fn messages(&self, id: &str) -> Vec<Envelope> {
        self.instances
            .borrow()
            .get(id)
            .map(|instance| instance.log.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop the recorded messages for `id`.
    pub fn clear(&self, id: &str) {
        if let Some(instance) = self.instances.borrow_mut().get_mut(id) {
            instance.log.clear();
        }
    }

    /// Release everything recorded for `id`, mounted or not.
    ///
    /// A mounted machine stays mounted without its replay hook and log;
    /// its next message is dropped as coming from an unknown machine.
    pub fn forget(&self, id: &str) -> bool {
        self.instances.borrow_mut().remove(id).is_some()
    }

    /// Ids with a log still held, mounted or retained.
    pub fn logged(&self) -> Vec<String> {
        self.instances.borrow().keys().cloned().collect()
    }

    /// Ask machine `id` to send its transition table again.
    ///
    /// Returns `false` when no such machine is mounted.
    pub fn request_transitions(&self, id: &str) -> bool {
        let replay = self
            .instances
            .borrow()
            .get(id)
            .and_then(|instance| instance.replay.clone());
        match replay {
            Some(replay) => {
                replay();
                true
            }
            None => false,
        }
    }
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Inspector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inspector")
            .field("config", &self.config)
            .field("instances", &self.instances.borrow().len())
            .finish()
    }
}

impl Manager for Inspector {
    fn mount(&self, id: &str, replay: Replay) {
        let mut instances = self.instances.borrow_mut();
        let instance = instances.entry(id.to_string()).or_default();
        if instance.replay.is_some() {
            tracing::warn!(machine = id, "machine id mounted twice; replacing replay hook");
        }
        instance.replay = Some(replay);
        tracing::debug!(machine = id, "inspector mounted machine");
    }

    fn send(&self, id: &str, message: Message) {
        let envelope = Envelope::new(id, message);
        {
            let mut instances = self.instances.borrow_mut();
            let Some(instance) = instances.get_mut(id) else {
                tracing::warn!(
                    machine = id,
                    kind = envelope.message.kind(),
                    "message from unmounted machine dropped"
                );
                return;
            };
            instance.log.push_back(envelope.clone());
            if let Some(max) = self.config.max_messages {
                while instance.log.len() > max {
                    instance.log.pop_front();
                }
            }
        }
        self.stream.emit(envelope);
    }

    fn unmount(&self, id: &str) {
        let mut instances = self.instances.borrow_mut();
        if self.config.retain_unmounted {
            if let Some(instance) = instances.get_mut(id) {
                instance.replay = None;
            }
        } else {
            instances.remove(id);
        }
        tracing::debug!(machine = id, "inspector unmounted machine");
    }
}
