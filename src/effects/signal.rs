//! Single-fire cancellation signal scoped to one activation.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

type AbortObserver = Box<dyn FnOnce()>;

struct SignalInner {
    aborted: Cell<bool>,
    on_abort: RefCell<Option<AbortObserver>>,
    wakers: RefCell<Vec<Waker>>,
}

/// Cancellation signal handed to an effect.
///
/// The signal goes from active to aborted exactly once, when the state that
/// owns the activation is exited. It has a single observer slot: setting a
/// new observer replaces the previous one.
///
/// # Example
///
/// ```rust
/// use mindset::effects::AbortSignal;
///
/// fn teardown_on_exit(signal: &AbortSignal) {
///     signal.set_on_abort(|| println!("state exited"));
/// }
/// ```
#[derive(Clone)]
pub struct AbortSignal {
    inner: Rc<SignalInner>,
}

impl AbortSignal {
    fn new() -> Self {
        Self {
            inner: Rc::new(SignalInner {
                aborted: Cell::new(false),
                on_abort: RefCell::new(None),
                wakers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.inner.aborted.get()
    }

    /// Register the abort observer, replacing any previous one.
    ///
    /// The observer runs synchronously inside the exit procedure. An
    /// observer registered after the signal fired is never called.
    pub fn set_on_abort<F>(&self, observer: F)
    where
        F: FnOnce() + 'static,
    {
        if self.is_aborted() {
            tracing::debug!("abort observer registered on an already aborted signal");
            return;
        }
        *self.inner.on_abort.borrow_mut() = Some(Box::new(observer));
    }

    /// Remove the abort observer, if any.
    pub fn clear_on_abort(&self) {
        self.inner.on_abort.borrow_mut().take();
    }

    /// Future that resolves once the signal is aborted.
    pub fn aborted(&self) -> Aborted {
        Aborted {
            signal: self.clone(),
        }
    }
}

impl fmt::Debug for AbortSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbortSignal")
            .field("aborted", &self.is_aborted())
            .finish()
    }
}

/// Future returned by [`AbortSignal::aborted`].
#[derive(Debug)]
pub struct Aborted {
    signal: AbortSignal,
}

impl Future for Aborted {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.signal.is_aborted() {
            return Poll::Ready(());
        }
        let mut wakers = self.signal.inner.wakers.borrow_mut();
        if !wakers.iter().any(|w| w.will_wake(cx.waker())) {
            wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }
}

/// Owner side of an [`AbortSignal`]; only the lifecycle manager aborts.
pub(crate) struct AbortController {
    signal: AbortSignal,
}

impl AbortController {
    pub(crate) fn new() -> Self {
        Self {
            signal: AbortSignal::new(),
        }
    }

    pub(crate) fn signal(&self) -> AbortSignal {
        self.signal.clone()
    }

    /// Fire the signal. Repeated calls are no-ops.
    pub(crate) fn abort(&self) {
        let inner = &self.signal.inner;
        if inner.aborted.replace(true) {
            return;
        }

        // Release both borrows before running user code.
        let observer = inner.on_abort.borrow_mut().take();
        let wakers = std::mem::take(&mut *inner.wakers.borrow_mut());

        if let Some(observer) = observer {
            observer();
        }
        for waker in wakers {
            waker.wake();
        }
    }
}
