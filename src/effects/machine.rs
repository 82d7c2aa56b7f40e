//! Machine blueprint: the configuration, its final states and the defaults
//! every instance starts from.

use super::effect::Spawner;
use super::error::MachineError;
use super::interpreter::Interpreter;
use crate::builder::MachineBuilder;
use crate::core::{classify, validate, Action, Config, ConfigError, FinalStates, State};
use std::fmt;
use std::rc::Rc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

struct Blueprint<S, A, C, P> {
    config: Config<S, A, C, P>,
    final_states: FinalStates<S>,
    initial_state: S,
    initial_context: Rc<C>,
    spawner: Option<Rc<dyn Spawner>>,
}

/// Immutable machine definition that spawns independent instances.
///
/// Cloning is cheap: clones share the same configuration and final-state
/// set.
pub struct Machine<S, A, C = (), P = ()> {
    blueprint: Rc<Blueprint<S, A, C, P>>,
}

impl<S: State, A: Action, C: Default + 'static, P: 'static> Machine<S, A, C, P> {
    /// Start building a machine whose initial context is `C::default()`.
    pub fn builder() -> MachineBuilder<S, A, C, P> {
        MachineBuilder::new()
    }
}

impl<S: State, A: Action, C: 'static, P: 'static> Machine<S, A, C, P> {
    /// Start building a machine with an explicit initial context.
    pub fn builder_with_context(context: C) -> MachineBuilder<S, A, C, P> {
        MachineBuilder::with_context(context)
    }

    /// Assemble a machine. Final states are classified here, once.
    pub(crate) fn from_parts(
        config: Config<S, A, C, P>,
        initial_state: S,
        initial_context: C,
        spawner: Option<Rc<dyn Spawner>>,
    ) -> Self {
        let final_states = classify(&config);
        Self {
            blueprint: Rc::new(Blueprint {
                config,
                final_states,
                initial_state,
                initial_context: Rc::new(initial_context),
                spawner,
            }),
        }
    }

    pub fn config(&self) -> &Config<S, A, C, P> {
        &self.blueprint.config
    }

    pub fn final_states(&self) -> &FinalStates<S> {
        &self.blueprint.final_states
    }

    pub fn initial_state(&self) -> &S {
        &self.blueprint.initial_state
    }

    pub fn initial_context(&self) -> Rc<C> {
        Rc::clone(&self.blueprint.initial_context)
    }

    pub(crate) fn spawner(&self) -> Option<&Rc<dyn Spawner>> {
        self.blueprint.spawner.as_ref()
    }

    /// Report every transition whose target is not declared.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<ConfigError>> {
        validate(&self.blueprint.config)
    }

    /// Create an instance in the initial state with the initial context.
    pub fn instantiate(&self) -> Result<Interpreter<S, A, C, P>, MachineError> {
        Interpreter::start(
            self.clone(),
            self.blueprint.initial_state.clone(),
            self.initial_context(),
        )
    }

    /// Create an instance from previously persisted values.
    ///
    /// Missing values fall back to the machine defaults. The entry effect of
    /// the recovered state runs exactly as on a fresh instance.
    pub fn recover(
        &self,
        state: Option<S>,
        context: Option<C>,
    ) -> Result<Interpreter<S, A, C, P>, MachineError> {
        let state = state.unwrap_or_else(|| self.blueprint.initial_state.clone());
        let context = context.map_or_else(|| self.initial_context(), Rc::new);
        Interpreter::start(self.clone(), state, context)
    }
}

impl<S, A, C, P> Clone for Machine<S, A, C, P> {
    fn clone(&self) -> Self {
        Self {
            blueprint: Rc::clone(&self.blueprint),
        }
    }
}

impl<S: State, A: Action, C: 'static, P: 'static> fmt::Debug for Machine<S, A, C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut states: Vec<&str> = self.config().states().map(|(s, _)| s.name()).collect();
        states.sort_unstable();
        f.debug_struct("Machine")
            .field("states", &states)
            .field("initial_state", self.initial_state())
            .field("final_states", &self.blueprint.final_states.len())
            .field("spawner", &self.blueprint.spawner.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StateDef;
    use crate::effects::EffectOutcome;
    use std::cell::Cell;

    fn final_states_machine() -> Machine<&'static str, &'static str> {
        Machine::builder()
            .state("a", StateDef::new().on("toB", "b").on("toC", "c"))
            .state("b", StateDef::new())
            .state("c", StateDef::new().on("toX", "x"))
            .state("x", StateDef::new())
            .initial("a")
            .build()
            .unwrap()
    }

    #[test]
    fn final_states_are_shared_between_instances() {
        let machine = final_states_machine();
        let clone = machine.clone();

        assert!(std::ptr::eq(machine.final_states(), clone.final_states()));
        assert_eq!(machine.final_states().len(), 2);
    }

    #[test]
    fn is_final_follows_current_state() {
        let machine = final_states_machine();

        let instance = machine.instantiate().unwrap();
        assert!(!instance.is_final());
        instance.dispatch("toB").unwrap();
        assert!(instance.is_final());

        let instance = machine.instantiate().unwrap();
        instance.dispatch("toC").unwrap();
        assert!(!instance.is_final());
        instance.dispatch("toX").unwrap();
        assert!(instance.is_final());
    }

    #[test]
    fn recover_uses_supplied_values() {
        let machine = final_states_machine();

        let default = machine.recover(None, None).unwrap();
        assert_eq!(default.state(), "a");

        let recovered = machine.recover(Some("x"), None).unwrap();
        assert_eq!(recovered.state(), "x");
        assert!(recovered.is_final());
    }

    #[test]
    fn recover_rejects_undeclared_state() {
        let machine = final_states_machine();
        let result = machine.recover(Some("nowhere"), None);

        assert!(matches!(
            result,
            Err(MachineError::UnknownState { ref state }) if state == "nowhere"
        ));
    }

    #[test]
    fn recovery_runs_entry_effect_once() {
        let entries = Rc::new(Cell::new(0));
        let sink = Rc::clone(&entries);
        let machine: Machine<&str, &str, u32> = Machine::builder()
            .state("idle", StateDef::new().on("start", "busy"))
            .state(
                "busy",
                StateDef::new().on("stop", "idle").effect(move |env| {
                    assert!(env.trigger().is_initial());
                    sink.set(sink.get() + 1);
                    Ok(EffectOutcome::Done)
                }),
            )
            .initial("idle")
            .build()
            .unwrap();

        let instance = machine.recover(Some("busy"), Some(42)).unwrap();

        assert_eq!(instance.state(), "busy");
        assert_eq!(*instance.context(), 42);
        assert_eq!(entries.get(), 1);
    }

    #[test]
    fn validate_reports_dangling_targets() {
        let machine: Machine<&str, &str> = Machine::builder()
            .state("a", StateDef::new().on("toZ", "z"))
            .initial("a")
            .build()
            .unwrap();

        assert!(machine.validate().is_failure());
        assert!(final_states_machine().validate().is_success());
    }
}
