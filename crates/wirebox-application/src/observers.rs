//! Synchronous observer lists
//!
//! Handlers are invoked in subscription order on the notifying thread. The
//! handler list is snapshotted before notification so a handler may subscribe
//! or unsubscribe without deadlocking.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

/// Handle returned by [`ObserverList::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Ordered list of callbacks for one notification kind
pub struct ObserverList<T> {
    handlers: RwLock<Vec<(SubscriptionId, Handler<T>)>>,
    next_id: AtomicU64,
}

impl<T> ObserverList<T> {
    /// Create an empty list
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Append a handler
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler; returns false if it was not subscribed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    /// Number of subscribed handlers
    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    /// True when nobody is subscribed
    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }

    /// Invoke every handler with `value`
    pub fn notify(&self, value: &T) {
        let snapshot: Vec<Handler<T>> = self
            .handlers
            .read()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in snapshot {
            handler(value);
        }
    }
}

impl<T> Default for ObserverList<T> {
    fn default() -> Self {
        Self::new()
    }
}
