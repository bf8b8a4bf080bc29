use std::time::SystemTime;

use uuid::Uuid;

use crate::{EventId, EventType};

/// Metadata attached to every envelope.
///
/// - `id`: unique identifier for the envelope.
/// - `timestamp`: publish time in nanoseconds since Unix epoch (truncated to `u64`).
/// - `event_type`: routing key the envelope was published under.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Meta {
    id: EventId,
    timestamp: u64,
    event_type: EventType,
}

impl Meta {
    /// Construct metadata stamped with the current wall-clock time.
    ///
    /// A clock set before the Unix epoch yields a zero timestamp.
    pub fn new(event_type: EventType) -> Self {
        Self {
            id: Uuid::new_v4().as_u128(),
            timestamp: SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or_default(),
            event_type,
        }
    }

    /// Unique identifier for this envelope.
    pub fn id(&self) -> EventId {
        self.id
    }

    /// Timestamp in nanoseconds since Unix epoch (u64 truncation).
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_ids_are_unique() {
        let a = Meta::new(EventType::from("x"));
        let b = Meta::new(EventType::from("x"));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_meta_is_stamped() {
        let meta = Meta::new(EventType::from("x"));
        assert!(meta.timestamp() > 0);
        assert_eq!(meta.event_type().as_str(), "x");
    }
}
