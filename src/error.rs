use std::{fmt::Display, sync::Arc};

use crate::EventType;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Event bus has already started.")]
    BusAlreadyStarted,

    #[error("Event bus has been stopped.")]
    BusStopped,

    #[error(
        "Event type '{event_type}' carries payload '{expected}', a subscriber for '{actual}' was rejected."
    )]
    PayloadMismatch {
        event_type: EventType,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Error external to Tapline occurred: {0}")]
    External(Arc<str>),

    #[error("Subscriber panicked: {0}")]
    SubscriberPanicked(Arc<str>),

    #[error("Delivery worker panicked.")]
    WorkerPanicked,

    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),
}

impl Error {
    /// Wrap a failure reported by subscriber code.
    ///
    /// ```rust
    /// # use tapline::Error;
    /// let err: Result<u32, _> = "x".parse::<u32>().map_err(Error::external);
    /// assert!(matches!(err, Err(Error::External(_))));
    /// ```
    pub fn external<D: Display>(error: D) -> Self {
        Error::External(error.to_string().into())
    }

    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let msg: Arc<str> = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            Arc::from(*msg)
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            Arc::from(msg.as_str())
        } else {
            Arc::from("unknown panic")
        };
        Error::SubscriberPanicked(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_extraction() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert!(matches!(
            Error::from_panic(boxed.as_ref()),
            Error::SubscriberPanicked(msg) if &*msg == "boom"
        ));

        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("formatted boom"));
        assert!(matches!(
            Error::from_panic(boxed.as_ref()),
            Error::SubscriberPanicked(msg) if &*msg == "formatted boom"
        ));

        let boxed: Box<dyn std::any::Any + Send> = Box::new(42_u8);
        assert!(matches!(
            Error::from_panic(boxed.as_ref()),
            Error::SubscriberPanicked(msg) if &*msg == "unknown panic"
        ));
    }

    #[test]
    fn test_payload_mismatch_message() {
        let err = Error::PayloadMismatch {
            event_type: EventType::from("data-fetched"),
            expected: "Vec<Beer>",
            actual: "String",
        };
        let msg = err.to_string();
        assert!(msg.contains("data-fetched"));
        assert!(msg.contains("Vec<Beer>"));
        assert!(msg.contains("String"));
    }
}
