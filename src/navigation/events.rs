//! Navigation events and the sink contract the manager publishes them through.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::view::ViewId;

pub const TOPIC_VIEW_REGISTERED: &str = "view:registered";
pub const TOPIC_NAVIGATION_STARTED: &str = "navigation:started";
pub const TOPIC_NAVIGATION_COMPLETE: &str = "navigation:complete";
pub const TOPIC_NAVIGATION_ERROR: &str = "navigation:error";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavigationEvent {
    ViewRegistered {
        view: ViewId,
        title: String,
    },
    NavigationStarted {
        from: Option<ViewId>,
        to: ViewId,
        deferred: bool,
        /// Length of the visual transition, when transitions are enabled
        transition_ms: Option<u64>,
    },
    NavigationComplete {
        from: Option<ViewId>,
        to: ViewId,
        duration_ms: f64,
    },
    NavigationError {
        from: Option<ViewId>,
        to: ViewId,
        error: String,
    },
}

impl NavigationEvent {
    pub fn topic(&self) -> &'static str {
        match self {
            NavigationEvent::ViewRegistered { .. } => TOPIC_VIEW_REGISTERED,
            NavigationEvent::NavigationStarted { .. } => TOPIC_NAVIGATION_STARTED,
            NavigationEvent::NavigationComplete { .. } => TOPIC_NAVIGATION_COMPLETE,
            NavigationEvent::NavigationError { .. } => TOPIC_NAVIGATION_ERROR,
        }
    }

    /// Target view of the event
    pub fn view(&self) -> &ViewId {
        match self {
            NavigationEvent::ViewRegistered { view, .. } => view,
            NavigationEvent::NavigationStarted { to, .. }
            | NavigationEvent::NavigationComplete { to, .. }
            | NavigationEvent::NavigationError { to, .. } => to,
        }
    }
}

/// What the manager needs from an event bus
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &NavigationEvent);
}

/// Sink for callers that do not observe navigation events
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &NavigationEvent) {}
}

type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Topic-keyed pub/sub bus. Handlers receive the event serialized to JSON.
#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Arc<Mutex<HashMap<String, Vec<Handler>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, topic: &str, handler: F)
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(topic.to_string())
            .or_default()
            .push(Arc::new(handler));
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .map_or(0, Vec::len)
    }

    /// Deliver `data` to every handler of `topic`. Handlers run without the
    /// bus lock held, so they may subscribe or publish themselves.
    pub fn publish(&self, topic: &str, data: &Value) {
        let subscribers: Vec<Handler> = self
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .cloned()
            .unwrap_or_default();
        if subscribers.is_empty() {
            return;
        }

        log::debug!("Broadcasting event '{}' to {} subscriber(s)", topic, subscribers.len());
        for handler in &subscribers {
            handler(data);
        }
    }
}

impl EventSink for EventBus {
    fn emit(&self, event: &NavigationEvent) {
        match serde_json::to_value(event) {
            Ok(data) => self.publish(event.topic(), &data),
            Err(e) => log::error!("Failed to serialize '{}' event: {}", event.topic(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_publish_reaches_topic_subscribers_only() {
        let bus = EventBus::new();
        let complete = Arc::new(AtomicUsize::new(0));
        let errors = Arc::new(AtomicUsize::new(0));

        let c = complete.clone();
        bus.subscribe(TOPIC_NAVIGATION_COMPLETE, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        let e = errors.clone();
        bus.subscribe(TOPIC_NAVIGATION_ERROR, move |_| {
            e.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(&NavigationEvent::NavigationComplete {
            from: None,
            to: ViewId::from("home"),
            duration_ms: 1.5,
        });

        assert_eq!(complete.load(Ordering::SeqCst), 1);
        assert_eq!(errors.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_event_payload_shape() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        bus.subscribe(TOPIC_NAVIGATION_STARTED, move |data| {
            s.lock().unwrap().push(data.clone());
        });

        bus.emit(&NavigationEvent::NavigationStarted {
            from: Some(ViewId::from("home")),
            to: ViewId::from("settings"),
            deferred: false,
            transition_ms: Some(300),
        });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0]["type"], "navigation_started");
        assert_eq!(seen[0]["from"], "home");
        assert_eq!(seen[0]["to"], "settings");
        assert_eq!(seen[0]["transition_ms"], 300);
    }

    #[test]
    fn test_handler_can_use_the_bus() {
        let bus = EventBus::new();
        let errors = Arc::new(AtomicUsize::new(0));

        let inner = bus.clone();
        let e = errors.clone();
        bus.subscribe(TOPIC_NAVIGATION_COMPLETE, move |_| {
            let e = e.clone();
            inner.subscribe(TOPIC_NAVIGATION_ERROR, move |_| {
                e.fetch_add(1, Ordering::SeqCst);
            });
            inner.emit(&NavigationEvent::NavigationError {
                from: None,
                to: ViewId::from("home"),
                error: "boom".to_string(),
            });
        });

        bus.emit(&NavigationEvent::NavigationComplete {
            from: None,
            to: ViewId::from("home"),
            duration_ms: 1.0,
        });

        assert_eq!(bus.subscriber_count(TOPIC_NAVIGATION_ERROR), 1);
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_topics() {
        let event = NavigationEvent::ViewRegistered {
            view: ViewId::from("home"),
            title: "Home".to_string(),
        };
        assert_eq!(event.topic(), "view:registered");
        assert_eq!(event.view().as_str(), "home");
    }
}
