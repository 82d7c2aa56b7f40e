//! Declarative machine configuration and final-state classification.
//!
//! A [`Config`] maps every declared state to a [`StateDef`]: its transition
//! table and an optional effect. The configuration itself has no behaviour.
//! Transition targets are checked lazily at dispatch time; [`validate`]
//! offers an eager report of every dangling target.

use super::state::{Action, State};
use crate::effects::{Effect, EffectEnv, EffectResult};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// Definition of a single state: where each action leads and what runs
/// while the state is active.
///
/// # Example
///
/// ```rust
/// use mindset::core::StateDef;
/// use mindset::effects::EffectOutcome;
///
/// let running: StateDef<&str, &str> = StateDef::new()
///     .on("stop", "stopped")
///     .on("reset", "stopped")
///     .effect(|_env| Ok(EffectOutcome::Done));
///
/// assert_eq!(running.target(&"stop"), Some(&"stopped"));
/// assert!(!running.is_final());
/// ```
pub struct StateDef<S, A, C = (), P = ()> {
    transitions: HashMap<A, S>,
    effect: Option<Effect<S, A, C, P>>,
}

impl<S: State, A: Action, C: 'static, P: 'static> StateDef<S, A, C, P> {
    /// Create a state without transitions or effect (a final state).
    pub fn new() -> Self {
        Self {
            transitions: HashMap::new(),
            effect: None,
        }
    }

    /// Add a transition taken when `action` is dispatched in this state.
    /// A later call for the same action replaces the earlier target.
    pub fn on(mut self, action: A, target: S) -> Self {
        self.transitions.insert(action, target);
        self
    }

    /// Attach the effect run on every entry into this state.
    ///
    /// Inside a builder chain, prefer
    /// [`MachineBuilder::state_with`](crate::builder::MachineBuilder::state_with)
    /// so the closure sees the machine's context and payload types.
    pub fn effect<F>(mut self, effect: F) -> Self
    where
        F: Fn(EffectEnv<S, A, C, P>) -> EffectResult + 'static,
    {
        self.effect = Some(Rc::new(effect));
        self
    }

    /// Target state for `action`, if the action is accepted here.
    pub fn target(&self, action: &A) -> Option<&S> {
        self.transitions.get(action)
    }

    /// Iterate over `(action, target)` pairs.
    pub fn transitions(&self) -> impl Iterator<Item = (&A, &S)> {
        self.transitions.iter()
    }

    pub fn has_effect(&self) -> bool {
        self.effect.is_some()
    }

    /// A state is final when it has no outgoing transitions.
    pub fn is_final(&self) -> bool {
        self.transitions.is_empty()
    }

    pub(crate) fn effect_fn(&self) -> Option<Effect<S, A, C, P>> {
        self.effect.clone()
    }
}

impl<S: State, A: Action, C: 'static, P: 'static> Default for StateDef<S, A, C, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, A: Action, C, P> fmt::Debug for StateDef<S, A, C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateDef")
            .field("transitions", &self.transitions)
            .field("effect", &self.effect.is_some())
            .finish()
    }
}

/// Mapping from every declared state to its definition.
pub struct Config<S, A, C = (), P = ()> {
    states: HashMap<S, StateDef<S, A, C, P>>,
}

impl<S: State, A: Action, C: 'static, P: 'static> Config<S, A, C, P> {
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
        }
    }

    /// Declare a state. Returns the definition back if the state was
    /// already declared.
    pub fn insert(
        &mut self,
        state: S,
        def: StateDef<S, A, C, P>,
    ) -> Result<(), (S, StateDef<S, A, C, P>)> {
        match self.states.entry(state) {
            Entry::Occupied(entry) => Err((entry.key().clone(), def)),
            Entry::Vacant(entry) => {
                entry.insert(def);
                Ok(())
            }
        }
    }

    pub fn get(&self, state: &S) -> Option<&StateDef<S, A, C, P>> {
        self.states.get(state)
    }

    pub fn contains(&self, state: &S) -> bool {
        self.states.contains_key(state)
    }

    /// Look up `transitions[state][action]`.
    pub fn target(&self, state: &S, action: &A) -> Option<&S> {
        self.states.get(state).and_then(|def| def.target(action))
    }

    pub fn states(&self) -> impl Iterator<Item = (&S, &StateDef<S, A, C, P>)> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub(crate) fn effect(&self, state: &S) -> Option<Effect<S, A, C, P>> {
        self.states.get(state).and_then(StateDef::effect_fn)
    }
}

impl<S: State, A: Action, C: 'static, P: 'static> Default for Config<S, A, C, P> {
    fn default() -> Self {
        Self::new()
    }
}

/// The set of states with no outgoing transitions.
///
/// Derived once per configuration and shared by every instance spawned
/// from the same machine.
#[derive(Clone, Debug)]
pub struct FinalStates<S> {
    states: HashSet<S>,
}

impl<S: State> FinalStates<S> {
    pub fn contains(&self, state: &S) -> bool {
        self.states.contains(state)
    }

    pub fn iter(&self) -> impl Iterator<Item = &S> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl<S: State> PartialEq for FinalStates<S> {
    fn eq(&self, other: &Self) -> bool {
        self.states == other.states
    }
}

impl<S: State> Eq for FinalStates<S> {}

/// Classify the final states of a configuration (pure).
///
/// A state is final iff its transition table is empty.
pub fn classify<S, A, C, P>(config: &Config<S, A, C, P>) -> FinalStates<S>
where
    S: State,
    A: Action,
    C: 'static,
    P: 'static,
{
    let states = config
        .states()
        .filter(|(_, def)| def.is_final())
        .map(|(state, _)| state.clone())
        .collect();
    FinalStates { states }
}

/// Inconsistencies found by eager configuration validation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Transition '{action}' from state '{from}' targets undeclared state '{target}'")]
    DanglingTarget {
        from: String,
        action: String,
        target: String,
    },
}

/// Check every transition target, accumulating ALL violations.
///
/// Dispatch never calls this; it is an opt-in, stricter check. Unreached
/// dangling transitions keep behaving as no-ops at runtime either way.
pub fn validate<S, A, C, P>(config: &Config<S, A, C, P>) -> Validation<(), NonEmptyVec<ConfigError>>
where
    S: State,
    A: Action,
    C: 'static,
    P: 'static,
{
    let checks: Vec<Validation<(), NonEmptyVec<ConfigError>>> = config
        .states()
        .flat_map(|(from, def)| {
            def.transitions().map(move |(action, target)| {
                if config.contains(target) {
                    Validation::success(())
                } else {
                    Validation::fail(ConfigError::DanglingTarget {
                        from: from.name().to_string(),
                        action: action.name().to_string(),
                        target: target.name().to_string(),
                    })
                }
            })
        })
        .collect();

    Validation::all_vec(checks).map(|_| ())
}
