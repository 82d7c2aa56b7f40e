//! The interpreter and the lifecycle of per-state effects.
//!
//! This module is the imperative shell around the declarative
//! configuration in [`crate::core`].
//!
//! # Key Concepts
//!
//! - **Machine**: immutable blueprint that spawns instances
//! - **Interpreter**: one running instance; owns state, context and the
//!   active effect
//! - **Effects**: run on every entry into their state, torn down on exit
//!   through an [`AbortSignal`] and an optional synchronous cleanup
//!
//! # Context window
//!
//! An effect may replace the context only during its synchronous portion.
//! For asynchronous effects that is everything up to the first suspension
//! point. Later writes, and dispatches after the state was exited, are
//! logged and ignored.

mod effect;
mod env;
mod error;
mod interpreter;
mod lifecycle;
mod machine;
mod signal;

pub use effect::{Cleanup, Effect, EffectOutcome, EffectResult, Spawner};
pub use env::{EffectEnv, EffectHandle};
pub use error::MachineError;
pub use interpreter::Interpreter;
pub use machine::Machine;
pub use signal::{AbortSignal, Aborted};
