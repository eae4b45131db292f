//! The pub/sub primitive used to fan out state changes.
//!
//! One logical topic exists per container. The container only depends on the
//! [`Topic`] trait, so tests (or embeddings with their own event bus) can
//! inject an alternative transport. [`LocalTopic`] is the in-crate
//! implementation: synchronous, FIFO, single-threaded.

use crate::types::SubscriptionId;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// A handler registered on a topic.
pub type Handler<M> = Rc<dyn Fn(&M)>;

/// An addressable channel delivering messages synchronously to all
/// currently-registered handlers, in registration order.
pub trait Topic<M> {
    /// Topic name (the owning container's name).
    fn name(&self) -> &str;

    /// Deliver a message to every registered handler, in registration order.
    fn publish(&self, message: &M);

    /// Register a handler. Returns the id used to remove it later.
    fn subscribe(&self, handler: Handler<M>) -> SubscriptionId;

    /// Remove a handler. Returns false if it was already removed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Number of currently-registered handlers.
    fn handler_count(&self) -> usize;
}

/// Synchronous in-process topic.
///
/// Re-entrancy: handlers may publish, subscribe, or unsubscribe from inside a
/// delivery. Handlers added during a broadcast do not receive the in-flight
/// message; handlers removed during a broadcast are skipped for the rest of
/// it.
pub struct LocalTopic<M> {
    name: String,
    next_id: Cell<u64>,
    handlers: RefCell<Vec<(SubscriptionId, Handler<M>)>>,
}

impl<M> LocalTopic<M> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            next_id: Cell::new(1),
            handlers: RefCell::new(Vec::new()),
        }
    }

    fn is_registered(&self, id: SubscriptionId) -> bool {
        self.handlers.borrow().iter().any(|(hid, _)| *hid == id)
    }
}

impl<M> Topic<M> for LocalTopic<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn publish(&self, message: &M) {
        // Snapshot the registration list so handlers can mutate it mid-flight
        // without invalidating the iteration.
        let snapshot: Vec<(SubscriptionId, Handler<M>)> =
            self.handlers.borrow().iter().cloned().collect();

        for (id, handler) in snapshot {
            if self.is_registered(id) {
                handler(message);
            }
        }
    }

    fn subscribe(&self, handler: Handler<M>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.handlers.borrow_mut().push((id, handler));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(hid, _)| *hid != id);
        handlers.len() != before
    }

    fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }
}
