//! Registration-side types: type-erased observer parts and the handle
//! returned by `subscribe`.

use crate::types::{EqualityPolicy, Selector, Subscriber, SubscriptionId};
use std::any::Any;
use std::cell::Cell;

/// Type-erased observer parts for registration across a dynamic boundary
/// (scripting embeddings, FFI registries).
///
/// Each slot holds a boxed callable of the expected shape; a slot holding
/// anything else fails validation in [`Observer::from_parts`] with the
/// corresponding error, before any registration side effect. The typed
/// `subscribe` surface on the container does not go through this — the type
/// system already guarantees callability there.
///
/// [`Observer::from_parts`]: crate::Observer::from_parts
pub struct ObserverParts {
    /// Expected to hold a `Subscriber<T>`.
    pub subscriber: Box<dyn Any>,
    /// Expected to hold a `Selector<S, T>`. Omitted means identity.
    pub selector: Option<Box<dyn Any>>,
    /// Expected to hold an `EqualityPolicy<T>`. Omitted means `PartialEq`.
    pub equality: Option<Box<dyn Any>>,
    /// Best-effort subscriber identifier carried into notify events.
    pub label: Option<String>,
}

impl ObserverParts {
    pub fn new(subscriber: Box<dyn Any>) -> Self {
        Self {
            subscriber,
            selector: None,
            equality: None,
            label: None,
        }
    }

    pub fn selector(mut self, selector: Box<dyn Any>) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn equality(mut self, equality: Box<dyn Any>) -> Self {
        self.equality = Some(equality);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Box a callback in the shape `from_parts` expects for the subscriber
    /// slot.
    pub fn subscriber_fn<T: 'static>(f: impl Fn(&T) + 'static) -> Box<dyn Any> {
        Box::new(Box::new(f) as Subscriber<T>)
    }

    /// Box a callback in the shape `from_parts` expects for the selector slot.
    pub fn selector_fn<S: 'static, T: 'static>(f: impl Fn(&S) -> T + 'static) -> Box<dyn Any> {
        Box::new(Box::new(f) as Selector<S, T>)
    }

    /// Box a callback in the shape `from_parts` expects for the equality slot.
    pub fn equality_fn<T: 'static>(f: impl Fn(&T, &T) -> bool + 'static) -> Box<dyn Any> {
        Box::new(Box::new(f) as EqualityPolicy<T>)
    }
}

/// Handle to an active subscription.
///
/// Dropping the handle does NOT cancel the subscription; it stays active
/// until [`unsubscribe`](Self::unsubscribe) is called. Repeat calls are
/// no-ops.
pub struct SubscriptionHandle {
    id: SubscriptionId,
    active: Cell<bool>,
    cancel: Box<dyn Fn()>,
}

impl SubscriptionHandle {
    pub(crate) fn new(id: SubscriptionId, cancel: Box<dyn Fn()>) -> Self {
        Self {
            id,
            active: Cell::new(true),
            cancel,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Remove the registration. Subsequent broadcasts no longer reach this
    /// subscriber. Idempotent.
    pub fn unsubscribe(&self) {
        if self.active.replace(false) {
            (self.cancel)();
        }
    }
}
