//! Inspector wire messages.

use crate::engine::TransitionTable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One observation sent by a machine to its manager.
///
/// Serializes as `{"type": "state" | "dispatch" | "transitions" | "command", ...}`.
/// States, actions and commands travel as JSON so the inspector does not need
/// to know the machine's types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    /// The machine's state reference changed (or the machine mounted).
    State {
        state: Value,
        transitions: TransitionTable,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },

    /// An action was dispatched.
    Dispatch { action: Value, ignored: bool },

    /// The transition table, replayed on request.
    Transitions { transitions: TransitionTable },

    /// A transition emitted a command.
    Command { command: Value },
}

impl Message {
    /// The `type` discriminant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::State { .. } => "state",
            Self::Dispatch { .. } => "dispatch",
            Self::Transitions { .. } => "transitions",
            Self::Command { .. } => "command",
        }
    }
}

/// A message stamped with the sending machine's id and the time it was
/// recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub message: Message,
}

impl Envelope {
    pub fn new(id: impl Into<String>, message: Message) -> Self {
        Self {
            id: id.into(),
            timestamp: Utc::now(),
            message,
        }
    }
}
