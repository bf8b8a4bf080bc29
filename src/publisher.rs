use std::sync::Arc;

use tokio::sync::mpsc::{UnboundedSender, error::SendError};

use crate::{Envelope, Event, EventType, internal::WorkerStatus};

/// Cloneable producer side of an [`EventBus`](crate::EventBus).
///
/// Hand one to every thread or task that emits events. Publishing is
/// fire-and-forget: it stamps the payload into an [`Envelope`], appends it
/// to the unbounded queue and returns, without waiting for (or reporting
/// on) delivery.
///
/// The queue has no capacity limit, so a producer that outpaces the
/// subscribers grows memory use instead of being slowed down.
#[derive(Clone)]
pub struct Publisher {
    sender: UnboundedSender<Envelope>,
    status: Arc<WorkerStatus>,
}

impl Publisher {
    pub(crate) fn new(sender: UnboundedSender<Envelope>, status: Arc<WorkerStatus>) -> Self {
        Self { sender, status }
    }

    /// Publish `event` under its declared event type.
    pub fn publish<E: Event>(&self, event: E) {
        self.publish_to(E::event_type(), event);
    }

    /// Publish `payload` under an explicit event type.
    ///
    /// Subscribers of `event_type` only receive it if they subscribed for
    /// payload type `P`; otherwise the worker logs and drops the envelope.
    pub fn publish_to<T, P>(&self, event_type: T, payload: P)
    where
        T: Into<EventType>,
        P: Send + Sync + 'static,
    {
        let envelope = Envelope::new(event_type.into(), payload);
        self.status.enqueued();
        if let Err(SendError(envelope)) = self.sender.send(envelope) {
            self.status.settled(1);
            tracing::debug!(
                event_type = %envelope.event_type(),
                "Event bus is stopped, dropping event"
            );
        }
    }

    /// Whether the delivery worker has terminated; publishing is then a no-op.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("closed", &self.is_closed())
            .finish()
    }
}
