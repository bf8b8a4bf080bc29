//! Record envelope metadata of every dispatched event to a JSON Lines file.
//!
//! Run with `cargo run --example recorder --features recorder`.

use std::time::Duration;

use tapline::{Event, EventBus, Result, monitors::Recorder};

#[derive(Event)]
struct Ping(u32);

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let path = std::env::temp_dir().join("tapline-events.jsonl");
    let bus = EventBus::default();
    bus.add_monitor(Recorder::new(&path)?)?;
    bus.subscribe(|ping: &Ping| {
        tracing::info!(n = ping.0, "Ping");
        Ok(())
    })?;

    bus.start()?;
    for n in 0..3 {
        bus.publish(Ping(n));
    }
    bus.wait_idle(Duration::from_secs(1));
    bus.stop(true)?;

    println!("{}", std::fs::read_to_string(&path)?);
    Ok(())
}
