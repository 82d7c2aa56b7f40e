//! Effect function types and their return contract.

use super::env::EffectEnv;
use super::error::MachineError;
use futures::executor::LocalSpawner;
use futures::future::{FutureExt, LocalBoxFuture};
use futures::task::LocalSpawnExt;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

/// Synchronous teardown run when the owning state is exited.
pub type Cleanup = Box<dyn FnOnce()>;

/// Result of invoking an effect.
pub type EffectResult = Result<EffectOutcome, MachineError>;

/// Effect attached to a state, invoked once per activation.
pub type Effect<S, A, C, P> = Rc<dyn Fn(EffectEnv<S, A, C, P>) -> EffectResult>;

/// What an effect hands back when its synchronous portion returns.
///
/// - `Done`: nothing to tear down.
/// - `Cleanup`: registered and run when the state is exited.
/// - `Pending`: the effect continues asynchronously. It is polled once
///   while context may still be set, then handed to the machine's
///   [`Spawner`]. The interpreter never waits for it, and a cleanup it
///   eventually resolves to is never run: asynchronous effects tear down
///   through their [`AbortSignal`](super::AbortSignal).
pub enum EffectOutcome {
    Done,
    Cleanup(Cleanup),
    Pending(LocalBoxFuture<'static, Option<Cleanup>>),
}

impl EffectOutcome {
    pub fn cleanup<F>(cleanup: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self::Cleanup(Box::new(cleanup))
    }

    /// Wrap an asynchronous effect body.
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = ()> + 'static,
    {
        Self::Pending(future.map(|()| None::<Cleanup>).boxed_local())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

impl fmt::Debug for EffectOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done => f.write_str("Done"),
            Self::Cleanup(_) => f.write_str("Cleanup(..)"),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Executor seam for the asynchronous remainder of effects.
///
/// Interpreters are single-threaded, so spawned futures are not `Send`.
pub trait Spawner {
    fn spawn(&self, future: LocalBoxFuture<'static, ()>);
}

impl Spawner for LocalSpawner {
    fn spawn(&self, future: LocalBoxFuture<'static, ()>) {
        if let Err(err) = self.spawn_local(future) {
            tracing::warn!(error = %err, "executor rejected pending effect");
        }
    }
}
