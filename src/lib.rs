//! Tapline - in-process event bus
//!
//! A small publish/subscribe bus that decouples event producers from
//! event consumers. Producers call [`EventBus::publish`], which stamps the
//! event into an [`Envelope`] and queues it without waiting. A single
//! delivery worker, running on its own thread, drains the queue and hands
//! each payload to the subscribers of its event type, in subscription order.
//!
//! ```rust
//! use tapline::{Event, EventBus, Result};
//!
//! #[derive(Debug, Event)]
//! #[event(name = "data-fetched")]
//! struct DataFetched {
//!     beers: usize,
//! }
//!
//! # fn main() -> Result<()> {
//! let bus = EventBus::default();
//! bus.subscribe(|event: &DataFetched| {
//!     println!("fetched {} beers", event.beers);
//!     Ok(())
//! })?;
//!
//! bus.start()?;
//! bus.publish(DataFetched { beers: 80 });
//! bus.wait_idle(std::time::Duration::from_secs(1));
//! bus.stop(true)?;
//! # Ok(())
//! # }
//! ```
//!
//! See `demos/beer_pipeline.rs` for a complete producer/consumer setup.

mod bus;
mod config;
mod envelope;
mod error;
mod event;
mod meta;
mod publisher;
mod subscriber;
mod worker_state;

mod internal;

pub mod monitoring;
pub mod monitors;

pub use bus::EventBus;
pub use config::Config;
pub use envelope::Envelope;
pub use error::Error;
pub use event::{Event, EventType};
pub use meta::Meta;
pub use publisher::Publisher;
pub use subscriber::Subscriber;
pub use worker_state::WorkerState;

#[cfg(feature = "macros")]
pub use tapline_macros::Event;

pub type Result<T = ()> = std::result::Result<T, Error>;
pub type EventId = u128;
