use std::{any::type_name, borrow::Cow};

use crate::{Envelope, Error};

/// Observer of the delivery worker.
///
/// All methods have empty default implementations; override the ones you
/// need. Callbacks run synchronously on the worker thread, between
/// subscriber invocations, so they should be cheap. A monitor that panics
/// is removed from the bus.
pub trait Monitor: Send {
    /// The envelope was dequeued and is about to be handed to `subscribers` subscribers.
    fn on_event_dispatched(&self, envelope: &Envelope, subscribers: usize) {
        let _e = envelope;
        let _s = subscribers;
    }

    fn on_event_delivered(&self, envelope: &Envelope, subscriber: &str) {
        let _e = envelope;
        let _s = subscriber;
    }

    /// A subscriber returned an error or panicked.
    fn on_subscriber_failed(&self, envelope: &Envelope, subscriber: &str, error: &Error) {
        let _e = envelope;
        let _s = subscriber;
        let _err = error;
    }

    /// No subscriber could take the envelope: the event type has no
    /// subscribers, or its payload type differs from the subscribed one.
    fn on_event_dropped(&self, envelope: &Envelope) {
        let _e = envelope;
    }

    /// The worker is terminating; `discarded` envelopes were left undelivered.
    fn on_worker_stop(&self, discarded: usize) {
        let _d = discarded;
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(type_name::<Self>())
    }
}
