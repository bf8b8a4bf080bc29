use std::{borrow::Borrow, fmt, hash::Hash, ops::Deref, sync::Arc};

/// Routing key of the bus.
///
/// Every envelope is routed by exact match on its event type; there are no
/// wildcards or hierarchies. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventType(Arc<str>);

impl EventType {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventType {
    fn from(name: &str) -> Self {
        Self(Arc::from(name))
    }
}

impl From<String> for EventType {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&EventType> for EventType {
    fn from(event_type: &EventType) -> Self {
        event_type.clone()
    }
}

impl Deref for EventType {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Borrow<str> for EventType {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A payload type bound to one event type.
///
/// Implementing `Event` declares which routing key a Rust type travels
/// under, so [`EventBus::publish`] and [`EventBus::subscribe`] can be called
/// without spelling the key out. Payloads are shared with the delivery
/// worker thread, hence `Send + Sync + 'static`.
///
/// `#[derive(Event)]` names the event after the type in kebab-case
/// (`DataFetched` becomes `"data-fetched"`); use `#[event(name = "...")]`
/// to pick the name explicitly.
///
/// ```rust
/// use tapline::Event;
///
/// #[derive(Event)]
/// #[event(name = "analysis-complete")]
/// struct Summary {
///     total_beers: usize,
/// }
///
/// assert_eq!(Summary::NAME, "analysis-complete");
/// ```
///
/// [`EventBus::publish`]: crate::EventBus::publish
/// [`EventBus::subscribe`]: crate::EventBus::subscribe
pub trait Event: Send + Sync + 'static {
    /// Event type this payload is published under.
    const NAME: &'static str;

    fn event_type() -> EventType {
        EventType::from(Self::NAME)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    // #[derive(Event)] expands to `impl ::tapline::Event`, which doesn't resolve
    // inside this crate; the derive is covered by tests/derive.rs.
    struct ManualEvent;

    impl Event for ManualEvent {
        const NAME: &'static str = "manual";
    }

    #[test]
    fn test_manual_event_type() {
        assert_eq!(ManualEvent::event_type(), EventType::from("manual"));
        assert_eq!(ManualEvent::event_type().as_str(), "manual");
    }

    #[test]
    fn test_event_type_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(EventType::from("beer-data-fetched"), 1);
        assert_eq!(map.get("beer-data-fetched"), Some(&1));
        assert_eq!(map.get("analysis-complete"), None);
    }

    #[test]
    fn test_event_type_display() {
        let event_type = EventType::from(String::from("analysis-complete"));
        assert_eq!(event_type.to_string(), "analysis-complete");
        assert_eq!(&*event_type, "analysis-complete");
    }
}
