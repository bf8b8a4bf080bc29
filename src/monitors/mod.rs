//! Ready-to-use monitor implementations.
//!
//! # Available Monitors
//!
//! - [`Tracer`] - Logs delivery lifecycle via `tracing` crate
//! - [`Recorder`] - Records envelope metadata to a JSON Lines file (requires `recorder` feature)
//!
//! # Example
//!
//! ```rust
//! use tapline::{EventBus, monitors::Tracer};
//!
//! let bus = EventBus::default();
//! bus.add_monitor(Tracer).unwrap();
//! ```

mod tracer;
pub use tracer::Tracer;

#[cfg(feature = "recorder")]
mod recorder;

#[cfg(feature = "recorder")]
pub use recorder::Recorder;
