//! The state container: atomic transform-and-broadcast over one topic.

use crate::error::Result;
use crate::instrument::{Instrument, LogAction, LogSink, TracingSink};
use crate::subscriptions::{Observer, ObserverParts, SubscriptionHandle};
use crate::topic::{Handler, LocalTopic, Topic};
use crate::types::{ContainerConfig, StateChange, SubscriptionId};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

struct ContainerInner<S> {
    /// State after the most recent completed update.
    current: RefCell<S>,
    /// State immediately before the most recent completed update.
    previous: RefCell<S>,
    topic: Rc<dyn Topic<StateChange<S>>>,
    instrument: Rc<Instrument>,
}

/// A selective-subscription state container.
///
/// Holds one value, replaces it atomically via pure transforms, and notifies
/// each subscriber only when the portion of state it selected has actually
/// changed. Single-threaded by construction (`Rc` + interior mutability);
/// all work happens synchronously on the caller's stack.
///
/// Cloning the container is cheap and yields another handle to the same
/// state and subscriptions.
///
/// # Example
///
/// ```
/// use statecell::Container;
///
/// #[derive(Clone, PartialEq, serde::Serialize)]
/// struct App { count: u32 }
///
/// let container = Container::new(App { count: 0 });
/// let sub = container.subscribe_select(
///     |app: &App| app.count,
///     |count| println!("count is now {count}"),
/// );
/// container.update(|app| App { count: app.count + 1 });
/// sub.unsubscribe();
/// ```
pub struct Container<S> {
    inner: Rc<ContainerInner<S>>,
}

impl<S> Clone for Container<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: Clone + Serialize + 'static> Container<S> {
    /// Create a container with the default config (name "Unknown", logging
    /// disabled).
    pub fn new(initial: S) -> Self {
        Self::with_config(initial, ContainerConfig::default())
    }

    /// Create a container with an in-process topic named after the container
    /// and the `tracing`-backed event sink.
    pub fn with_config(initial: S, config: ContainerConfig) -> Self {
        let topic: Rc<dyn Topic<StateChange<S>>> = Rc::new(LocalTopic::new(config.name.clone()));
        Self::with_parts(initial, config, topic, Rc::new(TracingSink))
    }

    /// Create a container with an injected topic and event sink.
    pub fn with_parts(
        initial: S,
        config: ContainerConfig,
        topic: Rc<dyn Topic<StateChange<S>>>,
        sink: Rc<dyn LogSink>,
    ) -> Self {
        let instrument = Rc::new(Instrument::new(config.name, config.logging_enabled, sink));
        let inner = Rc::new(ContainerInner {
            current: RefCell::new(initial.clone()),
            previous: RefCell::new(initial),
            topic,
            instrument,
        });
        {
            let current = inner.current.borrow();
            let previous = inner.previous.borrow();
            inner
                .instrument
                .lifecycle(LogAction::Create, &*current, &*previous);
        }
        Self { inner }
    }

    /// Container display name.
    pub fn name(&self) -> &str {
        self.inner.instrument.container_name()
    }

    /// Clone of the current state.
    pub fn state(&self) -> S {
        self.inner.current.borrow().clone()
    }

    /// Clone of the state one generation behind.
    pub fn previous(&self) -> S {
        self.inner.previous.borrow().clone()
    }

    /// Number of active subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.inner.topic.handler_count()
    }

    /// Atomically replace the state and broadcast the change.
    ///
    /// The transform runs exactly once, synchronously, against the state at
    /// the moment of invocation; its result becomes the new current state and
    /// the old value becomes `previous`. The swap commits before the
    /// broadcast, so a subscriber that re-enters `update` observes the fully
    /// applied state and its own nested broadcast runs to completion before
    /// the outer one resumes. A transform that calls `update` itself panics
    /// on the interior borrow instead of losing a write.
    ///
    /// # Panics
    ///
    /// A panic from the transform leaves the state untouched. A panic from a
    /// subscriber propagates to the caller; the state swap has already
    /// committed and the remaining subscribers are skipped for that
    /// broadcast.
    pub fn update(&self, transform: impl FnOnce(&S) -> S) {
        let change = {
            let mut current = self.inner.current.borrow_mut();
            let old = current.clone();
            *current = transform(&old);
            *self.inner.previous.borrow_mut() = old.clone();
            StateChange {
                current: current.clone(),
                previous: old,
            }
        };

        self.inner
            .instrument
            .lifecycle(LogAction::Update, &change.current, &change.previous);
        self.inner.topic.publish(&change);
    }

    /// Subscribe to full state with the default equality policy.
    ///
    /// The subscriber is invoked once immediately with the current state,
    /// then once per update whose new state compares unequal to the old one.
    pub fn subscribe(&self, subscriber: impl Fn(&S) + 'static) -> SubscriptionHandle
    where
        S: PartialEq,
    {
        self.subscribe_observer(Observer::of(subscriber))
    }

    /// Subscribe to a selected view of state with the default equality
    /// policy.
    pub fn subscribe_select<T>(
        &self,
        selector: impl Fn(&S) -> T + 'static,
        subscriber: impl Fn(&T) + 'static,
    ) -> SubscriptionHandle
    where
        T: PartialEq + Serialize + 'static,
    {
        self.subscribe_observer(Observer::new(selector, subscriber))
    }

    /// Subscribe with full control over selector, equality policy and label.
    pub fn subscribe_observer<T: Serialize + 'static>(
        &self,
        observer: Observer<S, T>,
    ) -> SubscriptionHandle {
        let observer = Rc::new(observer);

        // The id only exists after registration; the dispatch closure reads
        // it through a shared slot for notify metadata.
        let id_slot: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));
        let handler: Handler<StateChange<S>> = {
            let observer = Rc::clone(&observer);
            let instrument = Rc::clone(&self.inner.instrument);
            let id_slot = Rc::clone(&id_slot);
            Rc::new(move |change: &StateChange<S>| {
                if let Some(selected) = observer.dispatch(change) {
                    let id = id_slot.get().unwrap_or(SubscriptionId(0));
                    instrument.notified(
                        &change.current,
                        &change.previous,
                        &selected,
                        id,
                        observer.label(),
                    );
                }
            })
        };
        let id = self.inner.topic.subscribe(handler);
        id_slot.set(Some(id));

        // Immediate invocation: a freshly attached observer always receives
        // the latest value exactly once, bypassing the equality policy.
        let current = self.inner.current.borrow().clone();
        let previous = self.inner.previous.borrow().clone();
        let selected = observer.prime(&current);
        self.inner
            .instrument
            .subscribed(&current, &previous, &selected);

        let inner = Rc::clone(&self.inner);
        SubscriptionHandle::new(
            id,
            Box::new(move || {
                if inner.topic.unsubscribe(id) {
                    let current = inner.current.borrow().clone();
                    let previous = inner.previous.borrow().clone();
                    inner
                        .instrument
                        .lifecycle(LogAction::Unsubscribe, &current, &previous);
                }
            }),
        )
    }

    /// Subscribe from type-erased parts, validating each slot before any
    /// registration side effect.
    ///
    /// Fails with [`ContainerError::InvalidSubscriber`],
    /// [`ContainerError::InvalidSelector`] or
    /// [`ContainerError::InvalidEqualityPolicy`]; on failure nothing is
    /// registered and the subscriber is never invoked.
    ///
    /// [`ContainerError::InvalidSubscriber`]: crate::ContainerError::InvalidSubscriber
    /// [`ContainerError::InvalidSelector`]: crate::ContainerError::InvalidSelector
    /// [`ContainerError::InvalidEqualityPolicy`]: crate::ContainerError::InvalidEqualityPolicy
    pub fn subscribe_parts<T>(&self, parts: ObserverParts) -> Result<SubscriptionHandle>
    where
        T: PartialEq + Serialize + 'static,
    {
        let observer = Observer::<S, T>::from_parts(parts)?;
        Ok(self.subscribe_observer(observer))
    }
}
