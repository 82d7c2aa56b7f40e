//! Builder API for ergonomic machine construction.
//!
//! This module provides the fluent [`MachineBuilder`] and macros for
//! declaring state and action enums with minimal boilerplate.

pub mod error;
pub mod machine;
pub mod macros;

pub use error::BuildError;
pub use machine::MachineBuilder;

use crate::core::{Action, State, StateDef};

/// Create a state definition with the given transitions and no effect.
///
/// # Example
///
/// ```
/// use mindset::builder::transitions;
///
/// let def = transitions::<&str, &str, (), ()>([("start", "running"), ("reset", "stopped")]);
/// assert_eq!(def.target(&"start"), Some(&"running"));
/// ```
pub fn transitions<S, A, C, P>(edges: impl IntoIterator<Item = (A, S)>) -> StateDef<S, A, C, P>
where
    S: State,
    A: Action,
    C: 'static,
    P: 'static,
{
    edges
        .into_iter()
        .fold(StateDef::new(), |def, (action, target)| def.on(action, target))
}

/// Create a final state definition: no transitions, no effect.
pub fn final_state<S, A, C, P>() -> StateDef<S, A, C, P>
where
    S: State,
    A: Action,
    C: 'static,
    P: 'static,
{
    StateDef::new()
}
