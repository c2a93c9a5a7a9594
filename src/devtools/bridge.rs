//! Per-machine link to a manager.

use super::manager::Manager;
use super::message::Message;
use crate::core::Tagged;
use crate::engine::TransitionTable;
use serde::Serialize;
use serde_json::{Map, Value};
use std::rc::Rc;

/// Discriminant keys used in placeholders for unserializable values.
pub(crate) const ACTION_KEY: &str = "type";
const STATE_KEY: &str = "state";
const COMMAND_KEY: &str = "cmd";

/// Forwards one machine's observations to its manager, if it has one.
///
/// Without a manager every method is a no-op and nothing is serialized.
#[derive(Clone)]
pub(crate) struct Bridge {
    id: Rc<str>,
    manager: Option<Rc<dyn Manager>>,
    transitions: Rc<TransitionTable>,
}

impl Bridge {
    pub(crate) fn new(
        id: Rc<str>,
        manager: Option<Rc<dyn Manager>>,
        transitions: TransitionTable,
    ) -> Self {
        Self {
            id,
            manager,
            transitions: Rc::new(transitions),
        }
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.manager.is_some()
    }

    /// Register with the manager. The replay hook holds the manager weakly.
    pub(crate) fn mount(&self) {
        let Some(manager) = &self.manager else {
            return;
        };
        let weak = Rc::downgrade(manager);
        let id = Rc::clone(&self.id);
        let transitions = Rc::clone(&self.transitions);
        manager.mount(
            &self.id,
            Rc::new(move || {
                if let Some(manager) = weak.upgrade() {
                    manager.send(
                        &id,
                        Message::Transitions {
                            transitions: (*transitions).clone(),
                        },
                    );
                }
            }),
        );
    }

    pub(crate) fn unmount(&self) {
        if let Some(manager) = &self.manager {
            manager.unmount(&self.id);
        }
    }

    /// Serialize `value` for a message; `None` only when detached.
    ///
    /// A value that fails to serialize is replaced by `{"<key>": "<tag>"}`
    /// so the message is still sent.
    pub(crate) fn encode<T>(&self, key: &'static str, value: &T) -> Option<Value>
    where
        T: Serialize + Tagged,
    {
        self.manager.as_ref()?;
        match serde_json::to_value(value) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(
                    machine = %self.id,
                    key,
                    tag = value.tag(),
                    %error,
                    "devtools serialization failed, sending the tag only"
                );
                let mut placeholder = Map::new();
                placeholder.insert(key.to_string(), Value::from(value.tag()));
                Some(Value::Object(placeholder))
            }
        }
    }

    pub(crate) fn state<S: Serialize + Tagged>(&self, state: &S, label: Option<&str>) {
        if let Some(state) = self.encode(STATE_KEY, state) {
            self.send(Message::State {
                state,
                transitions: (*self.transitions).clone(),
                label: label.map(str::to_string),
            });
        }
    }

    pub(crate) fn dispatch(&self, action: Option<Value>, ignored: bool) {
        if let Some(action) = action {
            self.send(Message::Dispatch { action, ignored });
        }
    }

    pub(crate) fn command<C: Serialize + Tagged>(&self, command: &C) {
        if let Some(command) = self.encode(COMMAND_KEY, command) {
            self.send(Message::Command { command });
        }
    }

    pub(crate) fn transitions(&self) {
        if self.is_attached() {
            self.send(Message::Transitions {
                transitions: (*self.transitions).clone(),
            });
        }
    }

    fn send(&self, message: Message) {
        if let Some(manager) = &self.manager {
            manager.send(&self.id, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devtools::Inspector;
    use serde::ser::Error as _;
    use serde::Serializer;
    use serde_json::json;

    #[derive(Debug, Serialize)]
    enum Phase {
        Idle,
    }

    crate::tagged!(Phase { Idle => "IDLE" });

    struct Broken;

    impl Serialize for Broken {
        fn serialize<Ser: Serializer>(&self, _: Ser) -> Result<Ser::Ok, Ser::Error> {
            Err(Ser::Error::custom("not today"))
        }
    }

    impl Tagged for Broken {
        const TAGS: &'static [&'static str] = &["BROKEN"];

        fn tag(&self) -> &'static str {
            "BROKEN"
        }
    }

    fn table() -> TransitionTable {
        TransitionTable::new().on("IDLE", ["GO"])
    }

    #[test]
    fn detached_bridge_does_nothing() {
        let bridge = Bridge::new("m".into(), None, table());
        bridge.mount();
        assert!(bridge.encode(STATE_KEY, &Phase::Idle).is_none());
        bridge.state(&Phase::Idle, None);
        bridge.unmount();
    }

    #[test]
    fn replay_resends_transitions() {
        let inspector = Rc::new(Inspector::new());
        let bridge = Bridge::new("m".into(), Some(inspector.clone()), table());
        bridge.mount();

        assert!(inspector.request_transitions("m"));
        let messages = inspector.messages("m");
        assert_eq!(
            messages[0].message,
            Message::Transitions {
                transitions: table()
            }
        );
    }

    #[test]
    fn unserializable_values_are_sent_as_their_tag() {
        let inspector = Rc::new(Inspector::new());
        let bridge = Bridge::new("m".into(), Some(inspector.clone()), table());
        bridge.mount();

        bridge.command(&Broken);
        bridge.state(&Broken, None);
        bridge.dispatch(bridge.encode(ACTION_KEY, &Broken), false);

        let messages: Vec<_> = inspector
            .messages("m")
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(
            messages,
            vec![
                Message::Command {
                    command: json!({"cmd": "BROKEN"})
                },
                Message::State {
                    state: json!({"state": "BROKEN"}),
                    transitions: table(),
                    label: None,
                },
                Message::Dispatch {
                    action: json!({"type": "BROKEN"}),
                    ignored: false,
                },
            ]
        );
    }
}
