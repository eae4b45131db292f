//! # statecell
//!
//! A selective-subscription state container: one value, atomic replacement
//! via pure transforms, and notification of observers only when the portion
//! of state they selected has actually changed.
//!
//! ## Core Concepts
//!
//! - **Container**: owns current and previous state; `update` swaps them
//!   atomically and broadcasts once per call
//! - **Selector**: narrows full state to the view a subscriber cares about
//! - **Equality Policy**: decides whether two selected views count as
//!   unchanged (default: `PartialEq`)
//! - **Topic**: the pub/sub collaborator fanning changes out in subscription
//!   order, synchronously
//! - **Instrumentation**: structured lifecycle events, a pure side channel
//!
//! ## Example
//!
//! ```
//! use statecell::{Container, ContainerConfig};
//!
//! #[derive(Clone, PartialEq, serde::Serialize)]
//! struct Profile {
//!     name: String,
//!     visits: u64,
//! }
//!
//! let container = Container::with_config(
//!     Profile { name: "ada".into(), visits: 0 },
//!     ContainerConfig { name: "profile".into(), logging_enabled: false },
//! );
//!
//! // Invoked once immediately, then only when `name` changes.
//! let sub = container.subscribe_select(
//!     |p: &Profile| p.name.clone(),
//!     |name| println!("name: {name}"),
//! );
//!
//! // Changes an unrelated field: no notification.
//! container.update(|p| Profile { visits: p.visits + 1, ..p.clone() });
//!
//! container.update(|p| Profile { name: "grace".into(), ..p.clone() });
//! sub.unsubscribe();
//! ```

pub mod container;
pub mod error;
pub mod instrument;
pub mod subscriptions;
pub mod topic;
pub mod types;

// Re-exports
pub use container::Container;
pub use error::{ContainerError, Result};
pub use instrument::{Instrument, LogAction, LogEvent, LogSink, NotifyMeta, StateView, TracingSink};
pub use subscriptions::{Observer, ObserverParts, SubscriptionHandle};
pub use topic::{Handler, LocalTopic, Topic};
pub use types::{
    ContainerConfig, EqualityPolicy, Selector, StateChange, Subscriber, SubscriptionId,
};
