//! Core types shared across the container.

use serde::Serialize;

/// A subscriber callback, invoked with the selected view of state.
pub type Subscriber<T> = Box<dyn Fn(&T)>;

/// A selector narrowing full state to the view a subscriber cares about.
pub type Selector<S, T> = Box<dyn Fn(&S) -> T>;

/// A predicate deciding whether two selected values count as unchanged.
pub type EqualityPolicy<T> = Box<dyn Fn(&T, &T) -> bool>;

/// Unique identifier for a subscription on a topic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SubscriptionId(pub u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Container configuration.
#[derive(Clone, Debug)]
pub struct ContainerConfig {
    /// Display name identifying the container in emitted events.
    pub name: String,

    /// Whether lifecycle/data events are emitted at all.
    pub logging_enabled: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            name: "Unknown".to_string(),
            logging_enabled: false,
        }
    }
}

/// One completed state transition, broadcast to every active subscription.
///
/// Carries the pair by value so each subscription re-derives its selected
/// view from a consistent snapshot, even when a callback re-enters `update`
/// mid-broadcast.
#[derive(Clone, Debug)]
pub struct StateChange<S> {
    /// State after the update.
    pub current: S,
    /// State immediately before the update.
    pub previous: S,
}
