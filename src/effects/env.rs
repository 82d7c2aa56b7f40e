//! Environment handed to an effect body.
//!
//! Both context writes and dispatches are guarded. A write is only
//! accepted while the activation's open window lasts, and a dispatch only
//! while its signal has not fired. Rejected calls are logged at warn level
//! and otherwise ignored; they never fail the running instance.

use super::error::MachineError;
use super::interpreter::Shared;
use super::lifecycle::Gate;
use super::signal::AbortSignal;
use crate::core::{Action, ObservableCell, State, Trigger};
use std::fmt;
use std::rc::{Rc, Weak};

/// Cloneable handle onto one activation.
///
/// Effects capture this in cleanup closures, abort observers and futures.
/// It does not keep the instance alive; once the instance is dropped its
/// dispatches are ignored.
pub struct EffectHandle<S, A, C, P> {
    shared: Weak<Shared<S, A, C, P>>,
    context: Rc<ObservableCell<Rc<C>>>,
    signal: AbortSignal,
    gate: Gate,
    state: S,
}

impl<S: State, A: Action, C: 'static, P: 'static> EffectHandle<S, A, C, P> {
    pub(crate) fn new(
        shared: Weak<Shared<S, A, C, P>>,
        context: Rc<ObservableCell<Rc<C>>>,
        signal: AbortSignal,
        gate: Gate,
        state: S,
    ) -> Self {
        Self {
            shared,
            context,
            signal,
            gate,
            state,
        }
    }

    /// The state this activation belongs to.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Current context snapshot, read live.
    pub fn context(&self) -> Rc<C> {
        self.context.get()
    }

    /// Replace the context snapshot.
    ///
    /// Ignored (with a warning) once the effect's synchronous portion has
    /// returned or the state has been exited.
    pub fn set_context(&self, context: C) {
        if self.signal.is_aborted() {
            tracing::warn!(
                state = self.state.name(),
                "Context cannot be set after the effect has expired"
            );
            return;
        }
        if !self.gate.is_open() {
            tracing::warn!(
                state = self.state.name(),
                "Context can only be set synchronously during effect initialisation"
            );
            return;
        }
        self.context.set(Rc::new(context));
    }

    /// Dispatch an action on the owning instance.
    ///
    /// Ignored (with a warning) once the state has been exited.
    pub fn dispatch(&self, action: A) -> Result<(), MachineError> {
        self.forward(action, None)
    }

    pub fn dispatch_with(&self, action: A, payload: P) -> Result<(), MachineError> {
        self.forward(action, Some(payload))
    }

    pub fn signal(&self) -> &AbortSignal {
        &self.signal
    }

    /// Whether `set_context` would currently be accepted.
    pub fn can_set_context(&self) -> bool {
        self.gate.is_open() && !self.signal.is_aborted()
    }

    fn forward(&self, action: A, payload: Option<P>) -> Result<(), MachineError> {
        if self.signal.is_aborted() {
            tracing::warn!(
                state = self.state.name(),
                action = action.name(),
                "Cannot dispatch an action after the effect has expired"
            );
            return Ok(());
        }
        let Some(shared) = self.shared.upgrade() else {
            tracing::warn!(
                state = self.state.name(),
                action = action.name(),
                "Cannot dispatch an action on a dropped instance"
            );
            return Ok(());
        };
        shared.dispatch(action, payload)
    }
}

impl<S: Clone, A, C, P> Clone for EffectHandle<S, A, C, P> {
    fn clone(&self) -> Self {
        Self {
            shared: Weak::clone(&self.shared),
            context: Rc::clone(&self.context),
            signal: self.signal.clone(),
            gate: self.gate.clone(),
            state: self.state.clone(),
        }
    }
}

impl<S: fmt::Debug, A, C, P> fmt::Debug for EffectHandle<S, A, C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectHandle")
            .field("state", &self.state)
            .field("signal", &self.signal)
            .field("open", &self.gate.is_open())
            .finish()
    }
}

/// Everything an effect body receives for one activation.
///
/// # Example
///
/// ```rust
/// use mindset::core::StateDef;
/// use mindset::effects::EffectOutcome;
///
/// let counting = StateDef::<&str, &str, u32>::new()
///     .on("stop", "idle")
///     .effect(|env| {
///         let next = *env.context() + 1;
///         env.set_context(next);
///         Ok(EffectOutcome::Done)
///     });
/// # let _ = counting;
/// ```
pub struct EffectEnv<S, A, C, P> {
    trigger: Trigger<A>,
    payload: Option<P>,
    handle: EffectHandle<S, A, C, P>,
}

impl<S: State, A: Action, C: 'static, P: 'static> EffectEnv<S, A, C, P> {
    pub(crate) fn new(
        trigger: Trigger<A>,
        payload: Option<P>,
        handle: EffectHandle<S, A, C, P>,
    ) -> Self {
        Self {
            trigger,
            payload,
            handle,
        }
    }

    /// What caused this entry.
    pub fn trigger(&self) -> &Trigger<A> {
        &self.trigger
    }

    /// The triggering action; `None` on initial placement.
    pub fn action(&self) -> Option<&A> {
        self.trigger.action()
    }

    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    /// Move the dispatch payload out of the environment.
    pub fn take_payload(&mut self) -> Option<P> {
        self.payload.take()
    }

    pub fn state(&self) -> &S {
        self.handle.state()
    }

    pub fn context(&self) -> Rc<C> {
        self.handle.context()
    }

    pub fn set_context(&self, context: C) {
        self.handle.set_context(context);
    }

    pub fn dispatch(&self, action: A) -> Result<(), MachineError> {
        self.handle.dispatch(action)
    }

    pub fn dispatch_with(&self, action: A, payload: P) -> Result<(), MachineError> {
        self.handle.dispatch_with(action, payload)
    }

    pub fn signal(&self) -> &AbortSignal {
        self.handle.signal()
    }

    /// Cloneable handle for use beyond the effect's synchronous portion.
    pub fn handle(&self) -> EffectHandle<S, A, C, P> {
        self.handle.clone()
    }
}

impl<S: fmt::Debug, A: fmt::Debug, C, P> fmt::Debug for EffectEnv<S, A, C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectEnv")
            .field("trigger", &self.trigger)
            .field("payload", &self.payload.is_some())
            .field("handle", &self.handle)
            .finish()
    }
}
