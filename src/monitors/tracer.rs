use crate::{Envelope, Error, monitoring::Monitor};

/// Logs every step of envelope delivery.
///
/// Dispatch and delivery go to `trace`, drops and stops to `debug`,
/// subscriber failures to `warn` together with the envelope id.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tracer;

impl Monitor for Tracer {
    fn on_event_dispatched(&self, envelope: &Envelope, subscribers: usize) {
        tracing::trace!(
            event_id = %envelope.meta().id(),
            event_type = %envelope.event_type(),
            subscribers,
            "Event dispatched"
        );
    }

    fn on_event_delivered(&self, envelope: &Envelope, subscriber: &str) {
        tracing::trace!(
            event_id = %envelope.meta().id(),
            event_type = %envelope.event_type(),
            subscriber,
            "Event delivered"
        );
    }

    fn on_subscriber_failed(&self, envelope: &Envelope, subscriber: &str, error: &Error) {
        tracing::warn!(
            event_id = %envelope.meta().id(),
            event_type = %envelope.event_type(),
            subscriber,
            error = %error,
            "Delivery failed"
        );
    }

    fn on_event_dropped(&self, envelope: &Envelope) {
        tracing::debug!(
            event_id = %envelope.meta().id(),
            event_type = %envelope.event_type(),
            payload_type = envelope.payload_type_name(),
            "Event dropped"
        );
    }

    fn on_worker_stop(&self, discarded: usize) {
        tracing::debug!(discarded, "Worker stopped");
    }

    fn name(&self) -> std::borrow::Cow<'static, str> {
        "tracer".into()
    }
}
