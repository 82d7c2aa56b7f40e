//! Effect lifecycle: entering a state starts its effect, exiting tears it
//! down.
//!
//! At most one activation is live per instance. Exit always completes
//! before the state variable changes and before the next entry starts.

use super::effect::{Cleanup, EffectOutcome};
use super::env::{EffectEnv, EffectHandle};
use super::error::MachineError;
use super::interpreter::Shared;
use super::signal::{AbortController, AbortSignal};
use crate::core::{Action, State, Trigger};
use futures::future::LocalBoxFuture;
use std::cell::Cell;
use std::rc::Rc;
use std::task::{Context, Poll};

/// Open window of one activation: `OPEN -> CLOSED`, never reopened.
#[derive(Clone, Debug)]
pub(crate) struct Gate(Rc<Cell<bool>>);

impl Gate {
    fn open() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub(crate) fn is_open(&self) -> bool {
        self.0.get()
    }

    fn close(&self) {
        self.0.set(false);
    }
}

/// The live part of one state entry.
pub(crate) struct Activation {
    controller: AbortController,
    gate: Gate,
    cleanup: Option<Cleanup>,
}

impl Activation {
    fn new() -> Self {
        Self {
            controller: AbortController::new(),
            gate: Gate::open(),
            cleanup: None,
        }
    }

    /// Abort the signal (its observer runs synchronously), then run the
    /// registered cleanup.
    fn finish(self) {
        self.gate.close();
        self.controller.abort();
        if let Some(cleanup) = self.cleanup {
            cleanup();
        }
    }
}

impl<S: State, A: Action, C: 'static, P: 'static> Shared<S, A, C, P> {
    /// Start the effect of the current state, if it has one.
    pub(crate) fn enter(
        self: &Rc<Self>,
        trigger: Trigger<A>,
        payload: Option<P>,
    ) -> Result<(), MachineError> {
        let state = self.state.get();
        let Some(effect) = self.machine.config().effect(&state) else {
            tracing::debug!(
                state = state.name(),
                trigger = trigger.name(),
                "entered state without effect"
            );
            return Ok(());
        };

        let activation = Activation::new();
        let signal = activation.controller.signal();
        let gate = activation.gate.clone();

        // Installed before the body runs so that a nested dispatch from the
        // body exits this activation.
        let previous = self.active.borrow_mut().replace(activation);
        debug_assert!(previous.is_none(), "entered a state without exiting the previous one");

        tracing::debug!(
            state = state.name(),
            trigger = trigger.name(),
            "starting effect"
        );

        let handle = EffectHandle::new(
            Rc::downgrade(self),
            Rc::clone(&self.context),
            signal.clone(),
            gate.clone(),
            state.clone(),
        );
        let outcome = match effect(EffectEnv::new(trigger, payload, handle)) {
            Ok(outcome) => outcome,
            Err(err) => {
                gate.close();
                return Err(err);
            }
        };

        match outcome {
            EffectOutcome::Done => gate.close(),
            EffectOutcome::Cleanup(cleanup) => {
                gate.close();
                self.register_cleanup(&state, &signal, cleanup);
            }
            EffectOutcome::Pending(future) => self.continue_pending(&state, future, &gate),
        }
        Ok(())
    }

    /// Tear down the live activation, if any.
    pub(crate) fn exit(&self) {
        let activation = self.active.borrow_mut().take();
        let Some(activation) = activation else {
            return;
        };
        tracing::debug!(state = self.state.get().name(), "exiting effect");
        activation.finish();
    }

    fn register_cleanup(&self, state: &S, signal: &AbortSignal, cleanup: Cleanup) {
        // The body itself dispatched away from this state; its activation is
        // already gone, so tear down right away.
        if signal.is_aborted() {
            tracing::debug!(
                state = state.name(),
                "running cleanup of an effect exited during its own entry"
            );
            cleanup();
            return;
        }
        if let Some(active) = self.active.borrow_mut().as_mut() {
            active.cleanup = Some(cleanup);
        }
    }

    /// Poll the body once while the window is open, then hand the rest to
    /// the spawner. Whatever cleanup the future resolves to is dropped.
    fn continue_pending(
        &self,
        state: &S,
        mut future: LocalBoxFuture<'static, Option<Cleanup>>,
        gate: &Gate,
    ) {
        let mut cx = Context::from_waker(futures::task::noop_waker_ref());
        let first = future.as_mut().poll(&mut cx);
        gate.close();

        match first {
            Poll::Ready(cleanup) => ignore_async_cleanup(state.name(), cleanup),
            Poll::Pending => match self.machine.spawner() {
                Some(spawner) => {
                    let name = state.name().to_string();
                    spawner.spawn(Box::pin(async move {
                        let cleanup = future.await;
                        ignore_async_cleanup(&name, cleanup);
                    }));
                }
                None => tracing::warn!(
                    state = state.name(),
                    "no spawner configured; dropping pending effect"
                ),
            },
        }
    }
}

fn ignore_async_cleanup(state: &str, cleanup: Option<Cleanup>) {
    if cleanup.is_some() {
        tracing::warn!(state, "ignoring cleanup resolved by an asynchronous effect");
    }
}
