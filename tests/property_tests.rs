//! Property-based tests for the transition engine and effect binder.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated action sequences.

use proptest::prelude::*;
use serde::Serialize;
use statecraft::builder::MachineBuilder;
use statecraft::core::{Action, Command, Snapshot, State, Tagged};
use statecraft::devtools::{Inspector, Message};
use statecraft::effects::{Cleanup, CommandEffect, StateEffect, TransitionEffect};
use statecraft::engine::{transition, Step, TransitionTable, Transitions};
use statecraft::tagged;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
enum Room {
    X,
    A,
    B,
    Y,
}

tagged!(Room {
    X => "X",
    A => "A",
    B => "B",
    Y => "Y",
});

impl State for Room {}

#[derive(Debug, Clone, Serialize)]
enum Move {
    Go { to: Room },
    Ring,
    Poke,
}

tagged!(Move {
    Go => "GO",
    Ring => "RING",
    Poke => "POKE",
});

impl Action for Move {}

#[derive(Debug, Serialize)]
enum Bell {
    Rang { room: Room },
}

tagged!(Bell { Rang => "RANG" });

impl Command for Bell {}

struct House;

impl Transitions for House {
    type State = Room;
    type Action = Move;
    type Command = Bell;

    fn transition(&self, state: &Room, action: &Move) -> Step<Room, Bell> {
        match action {
            Move::Go { to } if to == state => Step::Ignored,
            Move::Go { to } => Step::To(*to),
            Move::Ring => Step::Emit(*state, Bell::Rang { room: *state }),
            Move::Poke => Step::Ignored,
        }
    }

    fn table(&self) -> TransitionTable {
        let handled = ["GO", "RING"];
        TransitionTable::new()
            .on("X", handled)
            .on("A", handled)
            .on("B", handled)
            .on("Y", handled)
    }
}

type HouseSnapshot = Snapshot<Room, Move, Bell>;

prop_compose! {
    fn arbitrary_room()(variant in 0..4u8) -> Room {
        match variant {
            0 => Room::X,
            1 => Room::A,
            2 => Room::B,
            _ => Room::Y,
        }
    }
}

fn arbitrary_move() -> impl Strategy<Value = Move> {
    prop_oneof![
        4 => arbitrary_room().prop_map(|to| Move::Go { to }),
        2 => Just(Move::Ring),
        1 => Just(Move::Poke),
    ]
}

fn inside(room: Room) -> bool {
    matches!(room, Room::A | Room::B)
}

proptest! {
    #[test]
    fn unhandled_action_keeps_the_same_reference(
        start in arbitrary_room(),
        moves in prop::collection::vec(arbitrary_move(), 0..20),
    ) {
        let mut snapshot = HouseSnapshot::initial(start);
        for action in moves {
            snapshot = transition(&snapshot, action, &House).snapshot;
        }

        let poked = transition(&snapshot, Move::Poke, &House);
        prop_assert!(poked.ignored);
        prop_assert!(poked.snapshot.same_state(&snapshot));

        let here = *snapshot.state();
        let stay = transition(&snapshot, Move::Go { to: here }, &House);
        prop_assert!(stay.ignored);
        prop_assert!(stay.snapshot.same_state(&snapshot));
    }

    #[test]
    fn handled_action_always_allocates_a_new_state(
        start in arbitrary_room(),
        moves in prop::collection::vec(arbitrary_move(), 1..20),
    ) {
        let mut snapshot = HouseSnapshot::initial(start);
        for action in moves {
            let next = transition(&snapshot, action, &House);
            prop_assert_eq!(next.ignored, next.snapshot.same_state(&snapshot));
            if !next.ignored {
                let record = next.snapshot.record().unwrap();
                prop_assert_eq!(record.prev().tag(), snapshot.tag());
            }
            snapshot = next.snapshot;
        }
    }

    #[test]
    fn dwell_effect_fires_once_per_boundary_crossing(
        start in arbitrary_room(),
        moves in prop::collection::vec(arbitrary_move(), 0..30),
    ) {
        let entered = Rc::new(Cell::new(0usize));
        let left = Rc::new(Cell::new(0usize));
        let (enter_count, leave_count) = (Rc::clone(&entered), Rc::clone(&left));

        let mut machine = MachineBuilder::new(House).initial(start).build().unwrap();
        machine.bind(
            StateEffect::new(["A", "B"], move |_: &Room| {
                enter_count.set(enter_count.get() + 1);
                let leave_count = Rc::clone(&leave_count);
                Some(Cleanup::new(move || leave_count.set(leave_count.get() + 1)))
            })
            .unwrap(),
        );

        let mut was_inside = inside(start);
        let mut expected_entries = usize::from(was_inside);
        let mut expected_exits = 0;
        for action in moves {
            machine.dispatch(action);
            machine.render();
            let now_inside = inside(*machine.state());
            match (was_inside, now_inside) {
                (false, true) => expected_entries += 1,
                (true, false) => expected_exits += 1,
                _ => {}
            }
            was_inside = now_inside;
        }

        prop_assert_eq!(entered.get(), expected_entries);
        prop_assert_eq!(left.get(), expected_exits);

        machine.dispose();
        prop_assert_eq!(entered.get(), left.get());
    }

    #[test]
    fn commands_are_delivered_at_most_once(
        start in arbitrary_room(),
        moves in prop::collection::vec((arbitrary_move(), 0..3usize), 0..30),
    ) {
        let delivered = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&delivered);

        let mut machine = MachineBuilder::new(House).initial(start).build().unwrap();
        machine.bind(
            CommandEffect::new("RANG", move |Bell::Rang { room }: &Bell| {
                sink.borrow_mut().push(*room)
            })
            .unwrap(),
        );

        let mut expected = Vec::new();
        for (action, rerenders) in moves {
            let dispatched = machine.dispatch(action);
            if let Some(Bell::Rang { room }) = dispatched.command() {
                expected.push(*room);
            }
            for _ in 0..rerenders {
                machine.render();
            }
        }

        prop_assert_eq!(&*delivered.borrow(), &expected);
    }

    #[test]
    fn transition_effect_sees_every_committed_transition(
        start in arbitrary_room(),
        moves in prop::collection::vec(arbitrary_move(), 0..30),
    ) {
        let fired = Rc::new(Cell::new(0usize));
        let counter = Rc::clone(&fired);

        let mut machine = MachineBuilder::new(House).initial(start).build().unwrap();
        machine.bind(TransitionEffect::any(move |_: &Room, _: &Move, _: &Room| {
            counter.set(counter.get() + 1)
        }));

        let mut committed = 0;
        for action in moves {
            if !machine.dispatch(action).ignored {
                committed += 1;
            }
        }

        prop_assert_eq!(fired.get(), committed);
    }

    #[test]
    fn devtools_log_mirrors_dispatches(
        start in arbitrary_room(),
        moves in prop::collection::vec(arbitrary_move(), 0..30),
    ) {
        let inspector = Rc::new(Inspector::new());
        let machine = MachineBuilder::new(House)
            .initial(start)
            .id("house")
            .devtools(inspector.clone())
            .build()
            .unwrap();

        let mut ignored_flags = Vec::new();
        for action in moves {
            ignored_flags.push(machine.dispatch(action).ignored);
        }

        let messages: Vec<Message> = inspector
            .messages("house")
            .into_iter()
            .map(|envelope| envelope.message)
            .collect();
        let dispatches: Vec<bool> = messages
            .iter()
            .filter_map(|message| match message {
                Message::Dispatch { ignored, .. } => Some(*ignored),
                _ => None,
            })
            .collect();
        let table = House.table();
        let states = messages
            .iter()
            .filter(|message| {
                matches!(message, Message::State { transitions, .. } if *transitions == table)
            })
            .count();

        prop_assert_eq!(&dispatches, &ignored_flags);
        prop_assert_eq!(states, 1 + ignored_flags.iter().filter(|ignored| !**ignored).count());
    }
}
