//! Statecraft: explicit finite state machines for UI components
//!
//! A component's behavior is a closed set of tagged states, a closed set of
//! tagged actions and a pure transition function between them. Transitions may
//! emit one-shot commands; effects react to transitions, commands and dwell
//! time after the state is committed, never during the transition itself.
//!
//! # Layers
//!
//! - [`core`]: tagged values and the [`Snapshot`] envelope that carries
//!   transition records out of band
//! - [`engine`]: the pure [`transition`] step, the [`Transitions`] trait and
//!   shape matching
//! - [`effects`]: transition, command and dwell-scoped effects
//! - [`emitter`]: a synchronous publish/subscribe channel for the environment
//! - [`devtools`]: the inspector protocol
//! - [`machine`]: a running instance tying them together
//!
//! # Example
//!
//! ```rust
//! use serde::Serialize;
//! use statecraft::builder::MachineBuilder;
//! use statecraft::core::{Action, Command, State};
//! use statecraft::effects::CommandEffect;
//! use statecraft::engine::{Step, TransitionTable, Transitions};
//! use statecraft::tagged;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! #[derive(Debug, Serialize)]
//! enum Drag {
//!     Idle,
//!     Detecting { initial_x: i32 },
//!     Resizing { x: i32 },
//! }
//!
//! tagged!(Drag {
//!     Idle => "IDLE",
//!     Detecting => "DETECTING_RESIZE",
//!     Resizing => "RESIZING",
//! });
//!
//! impl State for Drag {}
//!
//! #[derive(Debug, Serialize)]
//! enum Mouse {
//!     Down { x: i32 },
//!     Move { x: i32 },
//! }
//!
//! tagged!(Mouse {
//!     Down => "MOUSE_DOWN",
//!     Move => "MOUSE_MOVE",
//! });
//!
//! impl Action for Mouse {}
//!
//! #[derive(Debug, Serialize)]
//! enum Notify {
//!     Resize { x: i32 },
//! }
//!
//! tagged!(Notify { Resize => "NOTIFY_RESIZE" });
//!
//! impl Command for Notify {}
//!
//! struct Resizer;
//!
//! impl Transitions for Resizer {
//!     type State = Drag;
//!     type Action = Mouse;
//!     type Command = Notify;
//!
//!     fn transition(&self, state: &Drag, action: &Mouse) -> Step<Drag, Notify> {
//!         match (state, action) {
//!             (Drag::Idle, Mouse::Down { x }) => Step::To(Drag::Detecting { initial_x: *x }),
//!             (Drag::Detecting { initial_x }, Mouse::Move { x }) if (x - initial_x).abs() > 3 => {
//!                 Step::To(Drag::Resizing { x: *x })
//!             }
//!             (Drag::Resizing { .. }, Mouse::Move { x }) => {
//!                 Step::Emit(Drag::Resizing { x: *x }, Notify::Resize { x: *x })
//!             }
//!             _ => Step::Ignored,
//!         }
//!     }
//!
//!     fn table(&self) -> TransitionTable {
//!         TransitionTable::new()
//!             .on("IDLE", ["MOUSE_DOWN"])
//!             .on("DETECTING_RESIZE", ["MOUSE_MOVE"])
//!             .on("RESIZING", ["MOUSE_MOVE"])
//!     }
//! }
//!
//! let mut machine = MachineBuilder::new(Resizer).initial(Drag::Idle).build().unwrap();
//!
//! let widths = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&widths);
//! machine.bind(
//!     CommandEffect::new("NOTIFY_RESIZE", move |Notify::Resize { x }: &Notify| {
//!         sink.borrow_mut().push(*x)
//!     })
//!     .unwrap(),
//! );
//!
//! machine.dispatch(Mouse::Down { x: 100 });
//! assert!(machine.dispatch(Mouse::Move { x: 102 }).ignored);
//! machine.dispatch(Mouse::Move { x: 105 });
//! machine.dispatch(Mouse::Move { x: 110 });
//! machine.render();
//!
//! assert_eq!(*widths.borrow(), vec![110]);
//! machine.dispose();
//! ```

pub mod builder;
pub mod core;
pub mod devtools;
pub mod effects;
pub mod emitter;
pub mod engine;
pub mod machine;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder};
pub use crate::core::{Action, Command, NoCommand, Snapshot, State, Tagged};
pub use effects::{CommandEffect, StateEffect, TransitionEffect};
pub use emitter::{Emitter, Subscription};
pub use engine::{transition, Step, TransitionTable, Transitions};
pub use machine::{Dispatched, Dispatcher, Machine};
