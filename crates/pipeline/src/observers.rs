//! Subscription lists used by the graph model, config store and editor
//! components to notify passive views after every mutation.
//!
//! Callbacks run synchronously on the mutating call, after the component has
//! released its own lock, so a callback may read back the component that
//! notified it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Handle returned by [`Subscribers::subscribe`]; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// An ordered list of observer callbacks for events of type `E`.
pub struct Subscribers<E> {
    next_id: AtomicU64,
    callbacks: Mutex<Vec<(SubscriptionId, Callback<E>)>>,
}

impl<E> Subscribers<E> {
    /// Creates an empty subscriber list.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            callbacks: Mutex::new(Vec::new()),
        }
    }

    /// Registers `callback`; it is invoked for every subsequent event.
    pub fn subscribe(&self, callback: impl Fn(&E) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.callbacks.lock().push((id, Arc::new(callback)));
        id
    }

    /// Removes a callback. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut callbacks = self.callbacks.lock();
        let before = callbacks.len();
        callbacks.retain(|(existing, _)| *existing != id);
        callbacks.len() != before
    }

    /// Delivers `event` to every subscriber in registration order.
    pub fn notify(&self, event: &E) {
        // Snapshot so callbacks can subscribe/unsubscribe without deadlocking.
        let callbacks: Vec<Callback<E>> = self
            .callbacks
            .lock()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(event);
        }
    }
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Subscribers<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.callbacks.lock().len())
            .finish()
    }
}
