//! The collector side of the devtools channel.

use super::message::Message;
use std::rc::Rc;

/// Re-broadcast hook handed to a manager when a machine mounts.
///
/// Calling it makes the machine send a fresh `transitions` message.
pub type Replay = Rc<dyn Fn()>;

/// A central collector that machines report to.
///
/// A manager is handed to each machine at construction; there is no global
/// registry. Implementations must tolerate re-entrant calls: a `send` may
/// trigger listeners that dispatch into another machine, which sends again.
pub trait Manager {
    /// Register machine `id` and its replay hook.
    fn mount(&self, id: &str, replay: Replay);

    /// Record one message from machine `id`.
    fn send(&self, id: &str, message: Message);

    /// Deregister machine `id`. Its replay hook is released.
    fn unmount(&self, id: &str);
}
