//! Observing the delivery worker.
//!
//! A [`Monitor`] receives callbacks from the worker thread as envelopes are
//! dispatched, delivered, failed or dropped. Monitors are registered with
//! [`EventBus::add_monitor`](crate::EventBus::add_monitor) before the bus is
//! started. Ready-made implementations live in [`crate::monitors`].

mod monitor;
mod monitor_set;

pub use monitor::Monitor;
pub(crate) use monitor_set::MonitorSet;
