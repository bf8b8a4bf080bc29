/// Runtime configuration of an [`EventBus`](crate::EventBus).
///
/// Use the builder methods to customize, or [`Default`] for sensible defaults.
///
/// # Examples
///
/// ```rust
/// use tapline::Config;
///
/// let config = Config::default()
///     .with_worker_name("beer-events")   // Thread name shown in debuggers and panics
///     .with_drain_on_stop(true);         // Deliver queued events before stopping
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Config {
    /// Name of the delivery worker thread.
    /// Default: "tapline-worker"
    pub worker_name: String,

    /// Whether the worker delivers envelopes still queued when a stop is
    /// requested. When `false`, those envelopes are discarded (and counted
    /// in the logs). In-flight dispatch always completes.
    /// Default: false
    pub drain_on_stop: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            worker_name: "tapline-worker".into(),
            drain_on_stop: false,
        }
    }
}

impl Config {
    /// Set the name of the delivery worker thread.
    pub fn with_worker_name<S: Into<String>>(mut self, name: S) -> Self {
        self.worker_name = name.into();
        self
    }

    /// Choose between draining and discarding the queue on stop.
    ///
    /// Draining makes `stop` wait for every already-published event to be
    /// delivered, which may take as long as the slowest subscribers need.
    pub fn with_drain_on_stop(mut self, drain: bool) -> Self {
        self.drain_on_stop = drain;
        self
    }
}
