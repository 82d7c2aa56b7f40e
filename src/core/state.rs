//! Identifier traits for states and actions.
//!
//! A machine is generic over the identifiers it uses for its states and
//! actions. Anything that is cheap to clone, hashable and debuggable can be
//! used: string slices, owned strings, or plain enums via the
//! [`state_enum!`](crate::state_enum) and [`action_enum!`](crate::action_enum)
//! macros.

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state identifiers.
///
/// # Required Traits
///
/// - `Clone`: the current state is handed out by value
/// - `Eq` + `Hash`: states key the machine configuration
/// - `Debug`: states appear in diagnostics and errors
///
/// # Example
///
/// ```rust
/// use mindset::core::State;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Door {
///     Open,
///     Closed,
/// }
///
/// impl State for Door {
///     fn name(&self) -> &str {
///         match self {
///             Self::Open => "Open",
///             Self::Closed => "Closed",
///         }
///     }
/// }
///
/// assert_eq!(Door::Open.name(), "Open");
/// ```
pub trait State: Clone + Eq + Hash + Debug + 'static {
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;
}

/// Trait for action identifiers.
///
/// Actions label the edges of the transition table. They carry no data;
/// auxiliary data travels as the dispatch payload instead.
pub trait Action: Clone + Eq + Hash + Debug + 'static {
    /// Get the action's name for display/logging.
    fn name(&self) -> &str;
}

impl State for &'static str {
    fn name(&self) -> &str {
        self
    }
}

impl State for String {
    fn name(&self) -> &str {
        self.as_str()
    }
}

impl Action for &'static str {
    fn name(&self) -> &str {
        self
    }
}

impl Action for String {
    fn name(&self) -> &str {
        self.as_str()
    }
}

/// What caused a state to be entered.
///
/// Every activation is started either by a real action or by the initial
/// placement of an instance (fresh or recovered).
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Trigger<A> {
    /// Entry on instantiation or recovery.
    Initial,
    /// Entry caused by dispatching this action.
    Action(A),
}

impl<A: Action> Trigger<A> {
    /// The triggering action, if the entry was caused by one.
    pub fn action(&self) -> Option<&A> {
        match self {
            Self::Initial => None,
            Self::Action(action) => Some(action),
        }
    }

    pub fn is_initial(&self) -> bool {
        matches!(self, Self::Initial)
    }

    /// Name used in logs; the sentinel reads as `@initial`.
    pub fn name(&self) -> &str {
        match self {
            Self::Initial => "@initial",
            Self::Action(action) => action.name(),
        }
    }
}
