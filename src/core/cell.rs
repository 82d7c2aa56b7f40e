//! Observable mutable cell.
//!
//! The interpreter keeps its current state and context in cells. A write is
//! visible to the very next read, and registered observers are notified
//! after every write. UI layers hook into the observers; the interpreter
//! itself never depends on them.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Handle returned by [`ObservableCell::subscribe`], used to unsubscribe.
///
/// Ids are unique process-wide, so one id never matches an observer of a
/// different cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

type Observer<T> = Rc<dyn Fn(&T)>;

/// A single-threaded cell with read-after-write visibility and change
/// notification.
///
/// # Example
///
/// ```rust
/// use mindset::core::ObservableCell;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let cell = ObservableCell::new(1);
/// let seen = Rc::new(Cell::new(0));
/// let sink = Rc::clone(&seen);
/// cell.subscribe(move |value: &i32| sink.set(*value));
///
/// cell.set(7);
/// assert_eq!(cell.get(), 7);
/// assert_eq!(seen.get(), 7);
/// ```
pub struct ObservableCell<T> {
    value: RefCell<T>,
    observers: RefCell<Vec<(SubscriptionId, Observer<T>)>>,
}

impl<T: Clone> ObservableCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
            observers: RefCell::new(Vec::new()),
        }
    }

    /// Read the current value.
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Replace the value, then notify observers.
    ///
    /// No borrow is held while observers run, so an observer may read the
    /// cell or even write it again.
    pub fn set(&self, value: T) {
        *self.value.borrow_mut() = value;

        let observers: Vec<Observer<T>> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        if observers.is_empty() {
            return;
        }

        let current = self.get();
        for observer in observers {
            observer(&current);
        }
    }

    /// Register an observer called with the new value after every write.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&T) + 'static,
    {
        let id = SubscriptionId::next();
        self.observers.borrow_mut().push((id, Rc::new(observer)));
        id
    }

    /// Remove an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for ObservableCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableCell")
            .field("value", &*self.value.borrow())
            .field("observers", &self.observers.borrow().len())
            .finish()
    }
}
