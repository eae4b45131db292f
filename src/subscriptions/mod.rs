//! Subscription wrappers: selector + equality policy + subscriber callback.

mod observer;
mod types;

pub use observer::Observer;
pub use types::{ObserverParts, SubscriptionHandle};
