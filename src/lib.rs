//! Mindset: a finite state machine interpreter with cancellable effects
//!
//! A machine is declared as a set of states, the actions that move between
//! them, and an optional effect per state. Every instance spawned from the
//! machine runs the effect of the state it enters and tears it down again
//! when the state is left.
//!
//! # Core Concepts
//!
//! - **Config**: declarative `state -> (transitions, effect)` mapping
//! - **Final states**: states without outgoing transitions, derived once
//! - **Effects**: per-state side effects with a cancellation signal, an
//!   optional cleanup, and a short window in which they may set context
//! - **Interpreter**: one running instance with its own state and context
//!
//! # Example
//!
//! ```rust
//! use mindset::core::StateDef;
//! use mindset::effects::{EffectOutcome, Machine};
//!
//! #[derive(Clone, Debug, Default, PartialEq)]
//! struct Stopwatch {
//!     laps: u32,
//! }
//!
//! let machine = Machine::<&str, &str, Stopwatch>::builder()
//!     .state("stopped", StateDef::new().on("start", "running"))
//!     .state_with("running", |def| {
//!         def.on("stop", "stopped").effect(|env| {
//!             let laps = env.context().laps + 1;
//!             env.set_context(Stopwatch { laps });
//!             Ok(EffectOutcome::cleanup(|| println!("stopwatch paused")))
//!         })
//!     })
//!     .initial("stopped")
//!     .build()
//!     .unwrap();
//!
//! let instance = machine.instantiate().unwrap();
//! instance.dispatch("start").unwrap();
//! assert_eq!(instance.state(), "running");
//! assert_eq!(instance.context().laps, 1);
//!
//! instance.dispatch("stop").unwrap();
//! assert_eq!(instance.state(), "stopped");
//! assert!(!instance.is_final());
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod effects;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder};
pub use checkpoint::{Checkpoint, CheckpointError};
pub use crate::core::{Action, State, StateDef, Trigger};
pub use effects::{AbortSignal, EffectEnv, EffectOutcome, Interpreter, Machine, MachineError};
