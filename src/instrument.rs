//! Structured instrumentation events.
//!
//! A pure side channel: events describe what the container did and never
//! influence it. When logging is disabled no event values are constructed at
//! all, so production containers pay nothing for this module.

use crate::types::SubscriptionId;
use serde::Serialize;
use serde_json::Value;
use std::rc::Rc;

/// The five lifecycle points that produce an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogAction {
    Create,
    Update,
    Subscribe,
    Notify,
    Unsubscribe,
}

impl std::fmt::Display for LogAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogAction::Create => "create",
            LogAction::Update => "update",
            LogAction::Subscribe => "subscribe",
            LogAction::Notify => "notify",
            LogAction::Unsubscribe => "unsubscribe",
        };
        f.write_str(name)
    }
}

/// State captured in an event. Values that fail to serialize degrade to
/// `null` rather than surfacing an error into container operations.
#[derive(Clone, Debug, Serialize)]
pub struct StateView {
    pub current: Value,
    pub previous: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<Value>,
}

/// Metadata attached to `Notify` events.
#[derive(Clone, Debug, Serialize)]
pub struct NotifyMeta {
    pub subscription: SubscriptionId,
    /// Best-effort identifier for the subscriber (its label, if one was set).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber: Option<String>,
}

/// One emitted event. Transient: produced, handed to the sink, never read
/// back by the container.
#[derive(Clone, Debug, Serialize)]
pub struct LogEvent {
    pub container_name: String,
    pub action: LogAction,
    pub state: StateView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<NotifyMeta>,
}

/// Destination for emitted events.
///
/// Sinks must not panic; the container does not guard against a misbehaving
/// sink beyond the infallible signature.
pub trait LogSink {
    fn emit(&self, event: &LogEvent);
}

/// Default sink: emits each event at DEBUG via `tracing`.
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, event: &LogEvent) {
        let body = serde_json::to_string(event).unwrap_or_else(|_| "null".to_string());
        tracing::debug!(
            target: "statecell",
            container = %event.container_name,
            action = %event.action,
            event = %body,
        );
    }
}

fn capture<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Per-container instrumentation context shared by the container and its
/// subscription wrappers.
pub struct Instrument {
    name: String,
    enabled: bool,
    sink: Rc<dyn LogSink>,
}

impl Instrument {
    pub fn new(name: String, enabled: bool, sink: Rc<dyn LogSink>) -> Self {
        Self {
            name,
            enabled,
            sink,
        }
    }

    pub fn container_name(&self) -> &str {
        &self.name
    }

    /// Emit a lifecycle event carrying full state.
    pub fn lifecycle<S: Serialize>(&self, action: LogAction, current: &S, previous: &S) {
        if !self.enabled {
            return;
        }
        self.sink.emit(&LogEvent {
            container_name: self.name.clone(),
            action,
            state: StateView {
                current: capture(current),
                previous: capture(previous),
                selected: None,
            },
            meta: None,
        });
    }

    /// Emit a `Subscribe` event with the immediately-delivered selected value.
    pub fn subscribed<S: Serialize, T: Serialize>(&self, current: &S, previous: &S, selected: &T) {
        if !self.enabled {
            return;
        }
        self.sink.emit(&LogEvent {
            container_name: self.name.clone(),
            action: LogAction::Subscribe,
            state: StateView {
                current: capture(current),
                previous: capture(previous),
                selected: Some(capture(selected)),
            },
            meta: None,
        });
    }

    /// Emit a `Notify` event. Called only when the subscriber actually ran.
    pub fn notified<S: Serialize, T: Serialize>(
        &self,
        current: &S,
        previous: &S,
        selected: &T,
        subscription: SubscriptionId,
        label: Option<&str>,
    ) {
        if !self.enabled {
            return;
        }
        self.sink.emit(&LogEvent {
            container_name: self.name.clone(),
            action: LogAction::Notify,
            state: StateView {
                current: capture(current),
                previous: capture(previous),
                selected: Some(capture(selected)),
            },
            meta: Some(NotifyMeta {
                subscription,
                subscriber: label.map(str::to_string),
            }),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Sink that records every event it receives.
    pub struct RecordingSink {
        pub events: RefCell<Vec<LogEvent>>,
    }

    impl RecordingSink {
        pub fn new() -> Rc<Self> {
            Rc::new(Self {
                events: RefCell::new(Vec::new()),
            })
        }
    }

    impl LogSink for RecordingSink {
        fn emit(&self, event: &LogEvent) {
            self.events.borrow_mut().push(event.clone());
        }
    }

    #[test]
    fn test_disabled_emits_nothing() {
        let sink = RecordingSink::new();
        let instrument = Instrument::new("store".to_string(), false, Rc::clone(&sink) as _);

        instrument.lifecycle(LogAction::Create, &1, &1);
        instrument.subscribed(&1, &1, &1);
        instrument.notified(&2, &1, &2, SubscriptionId(1), Some("cb"));

        assert!(sink.events.borrow().is_empty());
    }

    #[test]
    fn test_event_shape() {
        let sink = RecordingSink::new();
        let instrument = Instrument::new("store".to_string(), true, Rc::clone(&sink) as _);

        instrument.notified(&2, &1, &2, SubscriptionId(9), Some("on_count"));

        let events = sink.events.borrow();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.container_name, "store");
        assert_eq!(event.action, LogAction::Notify);
        assert_eq!(event.state.current, serde_json::json!(2));
        assert_eq!(event.state.previous, serde_json::json!(1));
        assert_eq!(event.state.selected, Some(serde_json::json!(2)));
        let meta = event.meta.as_ref().unwrap();
        assert_eq!(meta.subscription, SubscriptionId(9));
        assert_eq!(meta.subscriber.as_deref(), Some("on_count"));
    }

    #[test]
    fn test_lifecycle_has_no_meta() {
        let sink = RecordingSink::new();
        let instrument = Instrument::new("store".to_string(), true, Rc::clone(&sink) as _);

        instrument.lifecycle(LogAction::Update, &2, &1);

        let events = sink.events.borrow();
        assert!(events[0].meta.is_none());
        assert!(events[0].state.selected.is_none());
    }

    #[test]
    fn test_serialized_action_names() {
        let json = serde_json::to_value(LogAction::Unsubscribe).unwrap();
        assert_eq!(json, serde_json::json!("unsubscribe"));
    }
}
