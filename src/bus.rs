use std::{
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
    thread::{JoinHandle, ThreadId},
    time::{Duration, Instant},
};

use tokio::sync::mpsc::unbounded_channel;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::{
    Config, Error, Event, EventType, Publisher, Result, Subscriber, WorkerState,
    internal::{Handler, Registry, Worker, WorkerStatus},
    monitoring::Monitor,
    subscriber::FnSubscriber,
};

enum Lifecycle {
    Ready(Worker),
    Running(JoinHandle<()>),
    Stopping(JoinHandle<()>),
    /// Another caller of `stop(true)` owns the handle and is joining it.
    Joining(ThreadId),
    Stopped,
}

/// In-process publish/subscribe bus with one background delivery worker.
///
/// - Register consumers with `subscribe(callback)` (or `subscribe_to` /
///   `subscribe_handler`). Subscribers of one event type are called in
///   the order they subscribed.
/// - `start()` spawns the delivery worker thread and returns immediately.
/// - `publish(event)` queues the event and returns without waiting for
///   delivery; it never fails. Hand out [`Publisher`]s to producer threads.
/// - `wait_idle(timeout)` blocks until everything published so far has
///   been delivered.
/// - `stop(wait)` cancels the worker; `wait = true` also joins its thread.
///
/// All methods take `&self`, so the bus can be shared behind an `Arc`.
/// Dropping the bus cancels the worker without joining it.
///
/// # Subscribing while events are in flight
///
/// The subscriber list for an envelope is read when the worker dequeues
/// it. A subscription made after `publish` but before the envelope is
/// dequeued receives it; a subscription made after that point, including
/// from inside another subscriber of the same event, does not.
///
/// # Failures
///
/// Subscribers run sequentially on the worker thread. One that returns an
/// error or panics is logged (with the event type and subscriber name) and
/// skipped; the remaining subscribers and all later events are unaffected.
/// A slow subscriber delays everything queued behind it.
pub struct EventBus {
    config: Config,
    registry: Arc<Registry>,
    publisher: Publisher,
    status: Arc<WorkerStatus>,
    cancel_token: CancellationToken,
    lifecycle: Mutex<Lifecycle>,
    joined: Condvar,
}

impl EventBus {
    /// Create a new bus with the given configuration. The worker is not started.
    pub fn new(config: Config) -> Self {
        let (tx, rx) = unbounded_channel();
        let registry = Arc::new(Registry::default());
        let status = Arc::new(WorkerStatus::default());
        let cancel_token = CancellationToken::new();
        let worker = Worker::new(
            rx,
            registry.clone(),
            cancel_token.clone(),
            status.clone(),
            config.drain_on_stop,
        );
        Self {
            config,
            registry,
            publisher: Publisher::new(tx, status.clone()),
            status,
            cancel_token,
            lifecycle: Mutex::new(Lifecycle::Ready(worker)),
            joined: Condvar::new(),
        }
    }

    /// Spawn the delivery worker thread. This returns immediately.
    ///
    /// Events published before `start` stay queued and are delivered once
    /// the worker runs.
    pub fn start(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle();
        match &*lifecycle {
            Lifecycle::Ready(_) => {}
            Lifecycle::Running(_) => return Err(Error::BusAlreadyStarted),
            Lifecycle::Stopping(_) | Lifecycle::Joining(_) | Lifecycle::Stopped => {
                return Err(Error::BusStopped);
            }
        }

        let runtime = tokio::runtime::Builder::new_current_thread().build()?;
        let Lifecycle::Ready(worker) = std::mem::replace(&mut *lifecycle, Lifecycle::Stopped)
        else {
            return Err(Error::BusStopped);
        };

        let span = tracing::debug_span!("worker", name = %self.config.worker_name);
        let spawned = std::thread::Builder::new()
            .name(self.config.worker_name.clone())
            .spawn(move || runtime.block_on(worker.run().instrument(span)));
        match spawned {
            Ok(handle) => {
                *lifecycle = Lifecycle::Running(handle);
                Ok(())
            }
            Err(e) => {
                self.cancel_token.cancel();
                self.status.set_state(WorkerState::Stopped);
                Err(e.into())
            }
        }
    }

    /// Request the worker to stop.
    ///
    /// The worker finishes the envelope it is dispatching, then stops
    /// dequeuing. Envelopes still queued are discarded, or delivered when
    /// [`Config::drain_on_stop`] is set. With `wait = true` this blocks
    /// until the worker thread has terminated.
    ///
    /// Stopping is final: the bus can't be started again, and later
    /// `publish` calls are no-ops. Calling `stop` again is harmless, and
    /// `stop(true)` after `stop(false)` joins the worker. Concurrent
    /// `stop(true)` calls all block until the worker has terminated; only
    /// the one that joins the thread reports [`Error::WorkerPanicked`].
    ///
    /// Called from inside a subscriber, `stop` only cancels: the worker
    /// thread can't join itself.
    pub fn stop(&self, wait: bool) -> Result<()> {
        self.cancel_token.cancel();
        let current = std::thread::current().id();
        let mut lifecycle = self.lifecycle();
        let handle = match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
            Lifecycle::Ready(worker) => {
                worker.abandon();
                return Ok(());
            }
            Lifecycle::Running(handle) | Lifecycle::Stopping(handle) => handle,
            Lifecycle::Joining(worker_thread) => {
                *lifecycle = Lifecycle::Joining(worker_thread);
                if wait && worker_thread != current {
                    let _stopped = self
                        .joined
                        .wait_while(lifecycle, |l| matches!(l, Lifecycle::Joining(_)))
                        .unwrap_or_else(PoisonError::into_inner);
                }
                return Ok(());
            }
            Lifecycle::Stopped => return Ok(()),
        };

        if !wait {
            *lifecycle = Lifecycle::Stopping(handle);
            return Ok(());
        }
        let worker_thread = handle.thread().id();
        if worker_thread == current {
            tracing::warn!("Stop requested from a subscriber, the worker can't join itself");
            *lifecycle = Lifecycle::Stopping(handle);
            return Ok(());
        }

        *lifecycle = Lifecycle::Joining(worker_thread);
        drop(lifecycle);
        let joined = handle.join();
        *self.lifecycle() = Lifecycle::Stopped;
        self.joined.notify_all();
        joined.map_err(|_| Error::WorkerPanicked)
    }

    /// Publish `event` under its declared event type. See [`Publisher::publish`].
    #[inline]
    pub fn publish<E: Event>(&self, event: E) {
        self.publisher.publish(event);
    }

    /// Publish `payload` under an explicit event type. See [`Publisher::publish_to`].
    #[inline]
    pub fn publish_to<T, P>(&self, event_type: T, payload: P)
    where
        T: Into<EventType>,
        P: Send + Sync + 'static,
    {
        self.publisher.publish_to(event_type, payload);
    }

    /// A cloneable producer handle for other threads or tasks.
    pub fn publisher(&self) -> Publisher {
        self.publisher.clone()
    }

    /// Subscribe a closure to the event type declared by `E`.
    ///
    /// There is no replay: only events dequeued after this call are delivered.
    pub fn subscribe<E, F>(&self, callback: F) -> Result<()>
    where
        E: Event,
        F: Fn(&E) -> Result<()> + Send + Sync + 'static,
    {
        self.register::<E, _>(E::event_type(), FnSubscriber(callback))
    }

    /// Subscribe a closure to an explicit event type.
    ///
    /// The first subscription of an event type fixes its payload type;
    /// subscribing with another payload type fails with
    /// [`Error::PayloadMismatch`].
    pub fn subscribe_to<T, P, F>(&self, event_type: T, callback: F) -> Result<()>
    where
        T: Into<EventType>,
        P: Send + Sync + 'static,
        F: Fn(&P) -> Result<()> + Send + Sync + 'static,
    {
        self.register::<P, _>(event_type.into(), FnSubscriber(callback))
    }

    /// Subscribe a [`Subscriber`] implementation to the event type declared by `E`.
    pub fn subscribe_handler<E, S>(&self, subscriber: S) -> Result<()>
    where
        E: Event,
        S: Subscriber<E>,
    {
        self.register::<E, _>(E::event_type(), subscriber)
    }

    fn register<P, S>(&self, event_type: EventType, subscriber: S) -> Result<()>
    where
        P: Send + Sync + 'static,
        S: Subscriber<P>,
    {
        let handler = Handler::new::<P, _>(subscriber);
        let name = handler.name.clone();
        self.registry.subscribe::<P>(event_type.clone(), handler)?;
        tracing::debug!(event_type = %event_type, subscriber = %name, "Subscribed");
        Ok(())
    }

    /// Number of subscribers registered for `event_type`.
    pub fn subscriber_count(&self, event_type: &str) -> usize {
        self.registry.subscriber_count(event_type)
    }

    /// Attach a [`Monitor`] to the worker. Only possible before [`start`](Self::start).
    pub fn add_monitor<M: Monitor + 'static>(&self, monitor: M) -> Result<()> {
        match &mut *self.lifecycle() {
            Lifecycle::Ready(worker) => {
                worker.add_monitor(Box::new(monitor));
                Ok(())
            }
            Lifecycle::Running(_) => Err(Error::BusAlreadyStarted),
            Lifecycle::Stopping(_) | Lifecycle::Joining(_) | Lifecycle::Stopped => {
                Err(Error::BusStopped)
            }
        }
    }

    /// Events published but not yet fully delivered (or discarded).
    pub fn pending(&self) -> usize {
        self.status.pending()
    }

    /// Block until every event published so far has been delivered.
    ///
    /// Returns `false` if events are still pending after `timeout`. Called
    /// from inside a subscriber it always times out, since the envelope
    /// being dispatched is still pending.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        while self.status.pending() > 0 {
            if start.elapsed() >= timeout {
                return false;
            }
            std::thread::sleep(Duration::from_micros(100));
        }
        true
    }

    pub fn worker_state(&self) -> WorkerState {
        self.status.state()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Drop for EventBus {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("config", &self.config)
            .field("worker_state", &self.worker_state())
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}
