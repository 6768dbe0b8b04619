//! Registry of persistent error observers.

use crate::error::SequentError;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// Callback notified of every handler failure with the error and the payload
/// of the failing item.
pub type ErrorObserver<T> = Arc<dyn Fn(&SequentError, &T) + Send + Sync>;

/// Observers registered on a queue. There is no unregister operation:
/// an observer lives as long as the queue.
///
/// Payloads only need to be `Clone` once an observer is registered; until
/// then the handler takes every payload without a copy being kept.
pub struct ErrorObservers<T> {
    observers: RwLock<Vec<ErrorObserver<T>>>,
    retain: OnceLock<fn(&T) -> T>,
}

impl<T: Clone> ErrorObservers<T> {
    /// Register an observer
    pub fn register(&self, observer: ErrorObserver<T>) {
        self.retain.get_or_init(|| T::clone as fn(&T) -> T);
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }
}

impl<T> ErrorObservers<T> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            observers: RwLock::new(Vec::new()),
            retain: OnceLock::new(),
        }
    }

    /// Copy of `payload` to report a failure with, or `None` while no
    /// observer has been registered.
    pub fn retain(&self, payload: &T) -> Option<T> {
        self.retain.get().map(|copy| copy(payload))
    }

    /// Number of registered observers
    pub fn len(&self) -> usize {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no observer is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call every observer in registration order.
    ///
    /// The list is snapshotted first, so an observer may register further
    /// observers without deadlocking; those only see later failures. A
    /// panicking observer is not caught.
    pub fn notify(&self, error: &SequentError, payload: &T) {
        let snapshot: Vec<ErrorObserver<T>> = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for observer in snapshot {
            observer(error, payload);
        }
    }
}

impl<T> Default for ErrorObservers<T> {
    fn default() -> Self {
        Self::new()
    }
}
