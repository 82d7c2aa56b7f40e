//! Running instance of a machine.

use super::error::MachineError;
use super::lifecycle::Activation;
use super::machine::Machine;
use crate::core::{Action, ObservableCell, State, SubscriptionId, Trigger};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Live fields of one instance, shared with the handles of its effects.
pub(crate) struct Shared<S, A, C, P> {
    pub(crate) machine: Machine<S, A, C, P>,
    pub(crate) state: ObservableCell<S>,
    pub(crate) context: Rc<ObservableCell<Rc<C>>>,
    pub(crate) active: RefCell<Option<Activation>>,
}

impl<S: State, A: Action, C: 'static, P: 'static> Shared<S, A, C, P> {
    /// Look up the transition, exit the current state, enter the target.
    ///
    /// Reentrant: effects may call back in while it runs. No borrow is held
    /// across effect code.
    pub(crate) fn dispatch(
        self: &Rc<Self>,
        action: A,
        payload: Option<P>,
    ) -> Result<(), MachineError> {
        let current = self.state.get();
        let config = self.machine.config();

        let Some(target) = config.target(&current, &action).cloned() else {
            tracing::trace!(
                state = current.name(),
                action = action.name(),
                "ignoring action not accepted in current state"
            );
            return Ok(());
        };
        if !config.contains(&target) {
            return Err(MachineError::UnknownTarget {
                state: current.name().to_string(),
                action: action.name().to_string(),
                target: target.name().to_string(),
            });
        }

        tracing::debug!(
            from = current.name(),
            to = target.name(),
            action = action.name(),
            "transition"
        );
        self.exit();
        self.state.set(target);
        self.enter(Trigger::Action(action), payload)
    }
}

/// A running interpreter created from a [`Machine`].
///
/// Single-threaded: effects may re-enter [`dispatch`](Self::dispatch) on
/// the same call stack, which is why the instance is neither `Send` nor
/// `Sync`. Dropping the instance exits its active effect.
///
/// # Example
///
/// ```rust
/// use mindset::core::StateDef;
/// use mindset::effects::Machine;
///
/// let machine = Machine::<&str, &str>::builder()
///     .state("a", StateDef::new().on("toB", "b"))
///     .state("b", StateDef::new())
///     .initial("a")
///     .build()
///     .unwrap();
///
/// let instance = machine.instantiate().unwrap();
/// assert_eq!(instance.state(), "a");
///
/// instance.dispatch("toB").unwrap();
/// assert_eq!(instance.state(), "b");
/// assert!(instance.is_final());
/// ```
pub struct Interpreter<S: State, A: Action, C: 'static = (), P: 'static = ()> {
    shared: Rc<Shared<S, A, C, P>>,
}

impl<S: State, A: Action, C: 'static, P: 'static> Interpreter<S, A, C, P> {
    /// Place a new instance and run the entry of its first state.
    pub(crate) fn start(
        machine: Machine<S, A, C, P>,
        state: S,
        context: Rc<C>,
    ) -> Result<Self, MachineError> {
        if !machine.config().contains(&state) {
            return Err(MachineError::UnknownState {
                state: state.name().to_string(),
            });
        }

        let interpreter = Self {
            shared: Rc::new(Shared {
                machine,
                state: ObservableCell::new(state),
                context: Rc::new(ObservableCell::new(context)),
                active: RefCell::new(None),
            }),
        };
        interpreter.shared.enter(Trigger::Initial, None)?;
        Ok(interpreter)
    }

    pub fn state(&self) -> S {
        self.shared.state.get()
    }

    /// Current context snapshot. Later changes install a new snapshot;
    /// this one never changes.
    pub fn context(&self) -> Rc<C> {
        self.shared.context.get()
    }

    /// Whether the current state has no outgoing transitions.
    pub fn is_final(&self) -> bool {
        self.shared
            .machine
            .final_states()
            .contains(&self.shared.state.get())
    }

    /// Dispatch an action without payload.
    ///
    /// Actions the current state does not accept are ignored. Fails only
    /// when the configuration names an undeclared target, or when an entered
    /// effect fails.
    pub fn dispatch(&self, action: A) -> Result<(), MachineError> {
        self.shared.dispatch(action, None)
    }

    /// Dispatch an action, forwarding `payload` to the entered effect.
    pub fn dispatch_with(&self, action: A, payload: P) -> Result<(), MachineError> {
        self.shared.dispatch(action, Some(payload))
    }

    /// The machine this instance was created from.
    pub fn machine(&self) -> &Machine<S, A, C, P> {
        &self.shared.machine
    }

    /// Observe every state change.
    pub fn on_state_change<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&S) + 'static,
    {
        self.shared.state.subscribe(observer)
    }

    /// Observe every context replacement.
    pub fn on_context_change<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&Rc<C>) + 'static,
    {
        self.shared.context.subscribe(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.state.unsubscribe(id) || self.shared.context.unsubscribe(id)
    }
}

impl<S: State, A: Action, C: 'static, P: 'static> Drop for Interpreter<S, A, C, P> {
    fn drop(&mut self) {
        self.shared.exit();
    }
}

impl<S: State, A: Action, C: fmt::Debug + 'static, P: 'static> fmt::Debug
    for Interpreter<S, A, C, P>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interpreter")
            .field("state", &self.state())
            .field("context", &self.context())
            .field("is_final", &self.is_final())
            .finish()
    }
}
