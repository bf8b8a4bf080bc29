use std::{
    any::{Any, TypeId, type_name},
    fmt,
    sync::Arc,
};

use crate::{EventType, Meta};

/// One published event on its way to the subscribers.
///
/// Created exactly once by `publish` and never modified afterwards. The
/// payload is type-erased: the bus never inspects it, it only checks that
/// its type matches the payload type declared for the event type before
/// handing it to subscribers.
///
/// Cloning is cheap, the payload is shared.
#[derive(Clone)]
pub struct Envelope {
    meta: Meta,
    payload: Arc<dyn Any + Send + Sync>,
    payload_type: &'static str,
}

impl Envelope {
    /// Wrap `payload` under the given event type, stamped with the current time.
    pub fn new<P>(event_type: EventType, payload: P) -> Self
    where
        P: Send + Sync + 'static,
    {
        Self {
            meta: Meta::new(event_type),
            payload: Arc::new(payload),
            payload_type: type_name::<P>(),
        }
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn event_type(&self) -> &EventType {
        self.meta.event_type()
    }

    /// Nanoseconds since Unix epoch at publish time.
    pub fn timestamp(&self) -> u64 {
        self.meta.timestamp()
    }

    /// Borrow the payload as `P`, or `None` if it was published as another type.
    pub fn payload<P: 'static>(&self) -> Option<&P> {
        self.payload.downcast_ref::<P>()
    }

    pub(crate) fn raw_payload(&self) -> &(dyn Any + Send + Sync) {
        self.payload.as_ref()
    }

    pub(crate) fn payload_type_id(&self) -> TypeId {
        (*self.payload).type_id()
    }

    /// Type name of the payload, for diagnostics only.
    pub fn payload_type_name(&self) -> &'static str {
        self.payload_type
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("meta", &self.meta)
            .field("payload_type", &self.payload_type)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Batch(Vec<u32>);

    #[test]
    fn test_payload_downcast() {
        let envelope = Envelope::new(EventType::from("batch"), Batch(vec![1, 2]));
        assert_eq!(envelope.payload::<Batch>(), Some(&Batch(vec![1, 2])));
        assert_eq!(envelope.payload::<String>(), None);
        assert_eq!(envelope.payload_type_id(), TypeId::of::<Batch>());
        assert!(envelope.payload_type_name().ends_with("Batch"));
    }

    #[test]
    fn test_clone_shares_payload() {
        let envelope = Envelope::new(EventType::from("batch"), Batch(vec![7]));
        let copy = envelope.clone();
        assert_eq!(copy.meta().id(), envelope.meta().id());
        assert!(std::ptr::eq(
            copy.payload::<Batch>().unwrap(),
            envelope.payload::<Batch>().unwrap()
        ));
    }
}
