//! One observer's registration: selector, equality policy, callback.

use crate::error::{ContainerError, Result};
use crate::types::{EqualityPolicy, Selector, StateChange, Subscriber};
use std::any::Any;

use super::types::ObserverParts;

/// Binds a selector and equality policy to a subscriber callback.
///
/// On every broadcast the observer re-derives its selected view from both
/// sides of the change and invokes the callback only when the equality policy
/// says the view changed.
pub struct Observer<S, T> {
    selector: Selector<S, T>,
    equality: EqualityPolicy<T>,
    subscriber: Subscriber<T>,
    label: Option<String>,
}

impl<S: 'static, T: PartialEq + 'static> Observer<S, T> {
    /// Observer with the default equality policy (`PartialEq`).
    ///
    /// `PartialEq` is structural in Rust, so selectors returning composite
    /// values DO suppress notifications when the selection is structurally
    /// unchanged. Callers who want pointer semantics on shared values supply
    /// e.g. `Rc::ptr_eq` via [`with_equality`](Self::with_equality); the
    /// container never imposes a comparison costlier than the state's own
    /// `PartialEq`.
    pub fn new(selector: impl Fn(&S) -> T + 'static, subscriber: impl Fn(&T) + 'static) -> Self {
        Self::with_equality(selector, |a: &T, b: &T| a == b, subscriber)
    }
}

impl<S: Clone + PartialEq + 'static> Observer<S, S> {
    /// Observer over full state: identity selector, default equality.
    pub fn of(subscriber: impl Fn(&S) + 'static) -> Self {
        Self::new(S::clone, subscriber)
    }
}

impl<S: 'static, T: 'static> Observer<S, T> {
    /// Observer with a custom equality policy.
    pub fn with_equality(
        selector: impl Fn(&S) -> T + 'static,
        equality: impl Fn(&T, &T) -> bool + 'static,
        subscriber: impl Fn(&T) + 'static,
    ) -> Self {
        Self {
            selector: Box::new(selector),
            equality: Box::new(equality),
            subscriber: Box::new(subscriber),
            label: None,
        }
    }

    /// Attach a best-effort identifier, carried into notify events.
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Change-gated dispatch for one broadcast. Returns the selected current
    /// value when the subscriber was actually invoked.
    pub(crate) fn dispatch(&self, change: &StateChange<S>) -> Option<T> {
        let previous = (self.selector)(&change.previous);
        let current = (self.selector)(&change.current);
        if (self.equality)(&current, &previous) {
            return None;
        }
        (self.subscriber)(&current);
        Some(current)
    }

    /// Immediate invocation on subscribe: bypasses the equality policy.
    pub(crate) fn prime(&self, state: &S) -> T {
        let selected = (self.selector)(state);
        (self.subscriber)(&selected);
        selected
    }
}

impl<S: Clone + 'static, T: PartialEq + 'static> Observer<S, T> {
    /// Build an observer from type-erased parts, validating each slot.
    ///
    /// Fails with [`ContainerError::InvalidSubscriber`],
    /// [`ContainerError::InvalidSelector`] or
    /// [`ContainerError::InvalidEqualityPolicy`] when the corresponding slot
    /// does not hold a callable of the expected shape. Validation completes
    /// before any side effect, so a failed build registers nothing.
    pub fn from_parts(parts: ObserverParts) -> Result<Self> {
        let subscriber = *parts
            .subscriber
            .downcast::<Subscriber<T>>()
            .map_err(|_| ContainerError::InvalidSubscriber)?;

        let selector = match parts.selector {
            Some(any) => *any
                .downcast::<Selector<S, T>>()
                .map_err(|_| ContainerError::InvalidSelector)?,
            // An omitted selector means identity, which only exists when the
            // selected type is the state type itself.
            None => identity_selector::<S, T>().ok_or(ContainerError::InvalidSelector)?,
        };

        let equality = match parts.equality {
            Some(any) => *any
                .downcast::<EqualityPolicy<T>>()
                .map_err(|_| ContainerError::InvalidEqualityPolicy)?,
            None => Box::new(|a: &T, b: &T| a == b),
        };

        Ok(Self {
            selector,
            equality,
            subscriber,
            label: parts.label,
        })
    }
}

/// The identity selector, available only when `T` is `S`. Resolved through
/// `Any` so `from_parts` can stay generic over both types.
fn identity_selector<S: Clone + 'static, T: 'static>() -> Option<Selector<S, T>> {
    let identity: Selector<S, S> = Box::new(S::clone);
    let any: Box<dyn Any> = Box::new(identity);
    any.downcast::<Selector<S, T>>().ok().map(|boxed| *boxed)
}
