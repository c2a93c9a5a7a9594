//! One-shot delivery of commands.

use super::binding::Binding;
use super::error::PatternError;
use super::transition::Tracker;
use crate::core::{Snapshot, Tagged};

/// Run a callback for every transition that emitted a given command.
///
/// Delivery is keyed on the transition, not on the state value: rendering
/// the same snapshot again never delivers its command a second time.
pub struct CommandEffect<S, C> {
    cmd: &'static str,
    effect: Box<dyn FnMut(&C)>,
    tracker: Tracker<S>,
}

impl<S, C: Tagged> CommandEffect<S, C> {
    pub fn new<F>(cmd: &'static str, effect: F) -> Result<Self, PatternError>
    where
        F: FnMut(&C) + 'static,
    {
        if !C::has_tag(cmd) {
            return Err(PatternError::UnknownCommand {
                tag: cmd.to_string(),
            });
        }
        Ok(Self {
            cmd,
            effect: Box::new(effect),
            tracker: Tracker::new(),
        })
    }

    pub fn command(&self) -> &'static str {
        self.cmd
    }

    pub fn render<A>(&mut self, snapshot: &Snapshot<S, A, C>) {
        let Some(command) = self
            .tracker
            .advance(snapshot)
            .and_then(|record| record.command())
            .filter(|command| command.tag() == self.cmd)
        else {
            return;
        };
        tracing::trace!(command = self.cmd, "command effect");
        (self.effect)(command);
    }

    pub fn dispose(&mut self) {
        self.tracker.reset();
    }
}

impl<S, A, C: Tagged> Binding<S, A, C> for CommandEffect<S, C> {
    fn render(&mut self, snapshot: &Snapshot<S, A, C>) {
        CommandEffect::render(self, snapshot);
    }

    fn dispose(&mut self) {
        CommandEffect::dispose(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Action, Command, State};
    use crate::engine::{transition, SnapshotOf, Step, TransitionTable, Transitions};
    use serde::Serialize;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Serialize)]
    enum Upload {
        Idle,
        Sending { bytes: u32 },
    }

    crate::tagged!(Upload {
        Idle => "IDLE",
        Sending => "SENDING",
    });

    impl State for Upload {}

    #[derive(Debug, Serialize)]
    enum Request {
        Send { bytes: u32 },
        Cancel,
    }

    crate::tagged!(Request {
        Send => "SEND",
        Cancel => "CANCEL",
    });

    impl Action for Request {}

    #[derive(Debug, Serialize, PartialEq)]
    enum Io {
        Post { bytes: u32 },
        Abort,
    }

    crate::tagged!(Io {
        Post => "POST",
        Abort => "ABORT",
    });

    impl Command for Io {}

    struct Uploader;

    impl Transitions for Uploader {
        type State = Upload;
        type Action = Request;
        type Command = Io;

        fn transition(&self, state: &Upload, action: &Request) -> Step<Upload, Io> {
            match (state, action) {
                (_, Request::Send { bytes }) => {
                    Step::Emit(Upload::Sending { bytes: *bytes }, Io::Post { bytes: *bytes })
                }
                (Upload::Sending { .. }, Request::Cancel) => Step::Emit(Upload::Idle, Io::Abort),
                (Upload::Idle, Request::Cancel) => Step::Ignored,
            }
        }

        fn table(&self) -> TransitionTable {
            TransitionTable::new()
                .on("IDLE", ["SEND"])
                .on("SENDING", ["SEND", "CANCEL"])
        }
    }

    fn posts() -> (Rc<RefCell<Vec<u32>>>, CommandEffect<Upload, Io>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let effect = CommandEffect::new("POST", move |command: &Io| {
            if let Io::Post { bytes } = command {
                sink.borrow_mut().push(*bytes);
            }
        })
        .unwrap();
        (log, effect)
    }

    #[test]
    fn command_fires_once_per_emitting_transition() {
        let (log, mut effect) = posts();
        let start = SnapshotOf::<Uploader>::initial(Upload::Idle);
        effect.render(&start);

        let sending = transition(&start, Request::Send { bytes: 10 }, &Uploader).snapshot;
        effect.render(&sending);
        effect.render(&sending);
        effect.render(&sending.clone());

        assert_eq!(*log.borrow(), vec![10]);
    }

    #[test]
    fn repeated_emission_is_delivered_again() {
        let (log, mut effect) = posts();
        let start = SnapshotOf::<Uploader>::initial(Upload::Idle);
        effect.render(&start);

        let first = transition(&start, Request::Send { bytes: 1 }, &Uploader).snapshot;
        effect.render(&first);
        let second = transition(&first, Request::Send { bytes: 2 }, &Uploader).snapshot;
        effect.render(&second);

        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[test]
    fn other_commands_are_not_delivered() {
        let (log, mut effect) = posts();
        let start = SnapshotOf::<Uploader>::initial(Upload::Sending { bytes: 3 });
        effect.render(&start);

        let idle = transition(&start, Request::Cancel, &Uploader).snapshot;
        assert_eq!(idle.command(), Some(&Io::Abort));
        effect.render(&idle);

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn unknown_command_is_rejected() {
        let result = CommandEffect::<Upload, Io>::new("EXPLODE", |_| {});
        assert!(matches!(
            result,
            Err(PatternError::UnknownCommand { tag }) if tag == "EXPLODE"
        ));
    }
}
