//! Builder for constructing machines.

use crate::builder::error::BuildError;
use crate::core::{Action, Config, State, StateDef};
use crate::effects::{Machine, Spawner};
use std::rc::Rc;

/// Builder for constructing machines with a fluent API.
///
/// # Example
///
/// ```rust
/// use mindset::builder::MachineBuilder;
/// use mindset::core::StateDef;
///
/// let machine = MachineBuilder::<&str, &str, u32>::with_context(10)
///     .state("green", StateDef::new().on("timer", "yellow"))
///     .state("yellow", StateDef::new().on("timer", "red"))
///     .state("red", StateDef::new().on("timer", "green"))
///     .initial("green")
///     .build()
///     .unwrap();
///
/// assert_eq!(*machine.initial_context(), 10);
/// assert!(machine.final_states().is_empty());
/// ```
pub struct MachineBuilder<S, A, C = (), P = ()> {
    config: Config<S, A, C, P>,
    duplicates: Vec<String>,
    initial: Option<S>,
    context: C,
    spawner: Option<Rc<dyn Spawner>>,
}

impl<S: State, A: Action, C: Default + 'static, P: 'static> MachineBuilder<S, A, C, P> {
    /// Create a new builder with `C::default()` as initial context.
    pub fn new() -> Self {
        Self::with_context(C::default())
    }
}

impl<S: State, A: Action, C: 'static, P: 'static> MachineBuilder<S, A, C, P> {
    /// Create a new builder with the given initial context.
    pub fn with_context(context: C) -> Self {
        Self {
            config: Config::new(),
            duplicates: Vec::new(),
            initial: None,
            context,
            spawner: None,
        }
    }

    /// Declare a state (required at least for the initial state).
    pub fn state(mut self, state: S, def: StateDef<S, A, C, P>) -> Self {
        if let Err((state, _)) = self.config.insert(state, def) {
            self.duplicates.push(state.name().to_string());
        }
        self
    }

    /// Declare a state, building its definition from an empty one.
    ///
    /// The definition handed to `define` already carries the builder's
    /// state, action, context and payload types, so effect closures can
    /// read `env.context()` or take the payload without annotations.
    pub fn state_with<F>(self, state: S, define: F) -> Self
    where
        F: FnOnce(StateDef<S, A, C, P>) -> StateDef<S, A, C, P>,
    {
        self.state(state, define(StateDef::new()))
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Replace the initial context.
    pub fn context(mut self, context: C) -> Self {
        self.context = context;
        self
    }

    /// Executor for the asynchronous remainder of effects (optional).
    pub fn spawner<Sp>(mut self, spawner: Sp) -> Self
    where
        Sp: Spawner + 'static,
    {
        self.spawner = Some(Rc::new(spawner));
        self
    }

    /// Build the machine.
    /// Returns an error if required fields are missing or inconsistent.
    pub fn build(self) -> Result<Machine<S, A, C, P>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        if let Some(state) = self.duplicates.into_iter().next() {
            return Err(BuildError::DuplicateState { state });
        }

        if !self.config.contains(&initial) {
            return Err(BuildError::UnknownInitialState {
                state: initial.name().to_string(),
            });
        }

        Ok(Machine::from_parts(
            self.config,
            initial,
            self.context,
            self.spawner,
        ))
    }
}

impl<S: State, A: Action, C: Default + 'static, P: 'static> Default
    for MachineBuilder<S, A, C, P>
{
    fn default() -> Self {
        Self::new()
    }
}
