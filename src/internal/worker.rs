use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

use tokio::{
    select,
    sync::mpsc::{UnboundedReceiver, error::TryRecvError},
};
use tokio_util::sync::CancellationToken;

use super::{Registry, WorkerStatus};
use crate::{
    Envelope, Error, WorkerState,
    monitoring::{Monitor, MonitorSet},
};

/// The single consumer of the pending queue.
///
/// Each envelope is delivered to the route snapshot taken when it is
/// dequeued: subscriptions made before that point are included, later
/// ones are not.
pub(crate) struct Worker {
    receiver: UnboundedReceiver<Envelope>,
    registry: Arc<Registry>,
    cancel_token: CancellationToken,
    status: Arc<WorkerStatus>,
    monitors: MonitorSet,
    drain_on_stop: bool,
}

impl Worker {
    pub fn new(
        receiver: UnboundedReceiver<Envelope>,
        registry: Arc<Registry>,
        cancel_token: CancellationToken,
        status: Arc<WorkerStatus>,
        drain_on_stop: bool,
    ) -> Self {
        Self {
            receiver,
            registry,
            cancel_token,
            status,
            monitors: MonitorSet::default(),
            drain_on_stop,
        }
    }

    pub fn add_monitor(&mut self, monitor: Box<dyn Monitor>) {
        self.monitors.add(monitor);
    }

    pub async fn run(mut self) {
        tracing::debug!(monitors = self.monitors.len(), "Delivery worker started");
        loop {
            self.status.set_state(WorkerState::WaitingOnQueue);
            select! {
                biased;
                _ = self.cancel_token.cancelled() => break,
                envelope = self.receiver.recv() => match envelope {
                    Some(envelope) => self.dispatch(envelope),
                    None => break,
                },
            }
        }
        self.shutdown();
    }

    /// Stop without ever having run: everything queued is discarded.
    pub fn abandon(mut self) {
        self.drain_on_stop = false;
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.receiver.close();
        let mut discarded = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(envelope) if self.drain_on_stop => self.dispatch(envelope),
                Ok(_) => discarded += 1,
                Err(TryRecvError::Disconnected) => break,
                // `len` counts sends admitted before `close` that have not landed yet.
                Err(TryRecvError::Empty) if self.receiver.len() > 0 => std::thread::yield_now(),
                Err(TryRecvError::Empty) => break,
            }
        }
        self.status.settled(discarded);
        if discarded > 0 {
            tracing::warn!(discarded, "Discarding undelivered events on stop");
        }
        self.monitors.notify(|m| m.on_worker_stop(discarded));
        self.status.set_state(WorkerState::Stopped);
        tracing::debug!("Delivery worker stopped");
    }

    fn dispatch(&mut self, envelope: Envelope) {
        self.status.set_state(WorkerState::Dispatching);
        self.deliver(&envelope);
        drop(envelope);
        self.status.settled(1);
        self.status.set_state(WorkerState::Idle);
    }

    fn deliver(&mut self, envelope: &Envelope) {
        let event_type = envelope.event_type();
        let Some(route) = self.registry.route(event_type) else {
            tracing::trace!(event_type = %event_type, "No subscribers, dropping event");
            self.monitors.notify(|m| m.on_event_dropped(envelope));
            return;
        };

        if route.payload_type != envelope.payload_type_id() {
            tracing::warn!(
                event_type = %event_type,
                expected = route.payload_name,
                actual = envelope.payload_type_name(),
                "Payload type mismatch, dropping event"
            );
            self.monitors.notify(|m| m.on_event_dropped(envelope));
            return;
        }

        self.monitors
            .notify(|m| m.on_event_dispatched(envelope, route.handlers.len()));

        for handler in route.handlers.iter() {
            let result = catch_unwind(AssertUnwindSafe(|| handler.call(envelope.raw_payload())))
                .unwrap_or_else(|panic| Err(Error::from_panic(&*panic)));
            match result {
                Ok(()) => {
                    self.monitors
                        .notify(|m| m.on_event_delivered(envelope, &handler.name));
                }
                Err(error) => {
                    tracing::error!(
                        event_type = %event_type,
                        subscriber = %handler.name,
                        error = %error,
                        "Subscriber failed"
                    );
                    self.monitors
                        .notify(|m| m.on_subscriber_failed(envelope, &handler.name, &error));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};

    use super::*;
    use crate::{EventType, Result, internal::Handler, subscriber::FnSubscriber};

    type Log = Arc<Mutex<Vec<String>>>;

    struct Fixture {
        sender: UnboundedSender<Envelope>,
        registry: Arc<Registry>,
        cancel_token: CancellationToken,
        status: Arc<WorkerStatus>,
        worker: Worker,
    }

    fn fixture(drain_on_stop: bool) -> Fixture {
        let (sender, receiver) = unbounded_channel();
        let registry = Arc::new(Registry::default());
        let cancel_token = CancellationToken::new();
        let status = Arc::new(WorkerStatus::default());
        let worker = Worker::new(
            receiver,
            registry.clone(),
            cancel_token.clone(),
            status.clone(),
            drain_on_stop,
        );
        Fixture {
            sender,
            registry,
            cancel_token,
            status,
            worker,
        }
    }

    fn subscribe(registry: &Registry, log: &Log, tag: &'static str, fail: bool) {
        let log = log.clone();
        let handler = Handler::new::<u32, _>(FnSubscriber(move |n: &u32| -> Result<()> {
            log.lock().unwrap().push(format!("{tag}:{n}"));
            if fail {
                return Err(Error::external("failing on purpose"));
            }
            Ok(())
        }));
        registry.subscribe::<u32>(EventType::from("x"), handler).unwrap();
    }

    fn publish(fx: &Fixture, payload: u32) {
        fx.status.enqueued();
        fx.sender
            .send(Envelope::new(EventType::from("x"), payload))
            .unwrap();
    }

    #[test]
    fn test_dispatch_in_subscription_order_despite_failures() {
        let mut fx = fixture(false);
        let log: Log = Arc::default();
        subscribe(&fx.registry, &log, "s1", false);
        subscribe(&fx.registry, &log, "s2", true);
        subscribe(&fx.registry, &log, "s3", false);

        fx.status.enqueued();
        fx.worker.dispatch(Envelope::new(EventType::from("x"), 7_u32));

        assert_eq!(*log.lock().unwrap(), vec!["s1:7", "s2:7", "s3:7"]);
        assert_eq!(fx.status.pending(), 0);
        assert_eq!(fx.status.state(), WorkerState::Idle);
    }

    #[test]
    fn test_panicking_subscriber_is_isolated() {
        let mut fx = fixture(false);
        let log: Log = Arc::default();
        let handler = Handler::new::<u32, _>(FnSubscriber(|_: &u32| -> Result<()> {
            panic!("subscriber blew up")
        }));
        fx.registry
            .subscribe::<u32>(EventType::from("x"), handler)
            .unwrap();
        subscribe(&fx.registry, &log, "after", false);

        fx.status.enqueued();
        fx.worker.dispatch(Envelope::new(EventType::from("x"), 1_u32));

        assert_eq!(*log.lock().unwrap(), vec!["after:1"]);
    }

    #[test]
    fn test_mismatched_payload_is_dropped() {
        let mut fx = fixture(false);
        let log: Log = Arc::default();
        subscribe(&fx.registry, &log, "s1", false);

        fx.status.enqueued();
        fx.worker
            .dispatch(Envelope::new(EventType::from("x"), String::from("not a number")));

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(fx.status.pending(), 0);
    }

    #[tokio::test]
    async fn test_run_until_cancelled_discards_rest() {
        let fx = fixture(false);
        let log: Log = Arc::default();
        subscribe(&fx.registry, &log, "s1", false);

        fx.cancel_token.cancel();
        publish(&fx, 1);
        publish(&fx, 2);

        let status = fx.status.clone();
        fx.worker.run().await;

        // Cancellation wins the biased select, nothing is dequeued.
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(status.pending(), 0);
        assert_eq!(status.state(), WorkerState::Stopped);
        assert!(fx.sender.is_closed());
    }

    #[tokio::test]
    async fn test_run_until_cancelled_drains_when_configured() {
        let fx = fixture(true);
        let log: Log = Arc::default();
        subscribe(&fx.registry, &log, "s1", false);

        fx.cancel_token.cancel();
        publish(&fx, 1);
        publish(&fx, 2);

        let status = fx.status.clone();
        fx.worker.run().await;

        assert_eq!(*log.lock().unwrap(), vec!["s1:1", "s1:2"]);
        assert_eq!(status.pending(), 0);
        assert_eq!(status.state(), WorkerState::Stopped);
    }

    #[tokio::test]
    async fn test_run_ends_when_all_senders_are_gone() {
        let fx = fixture(false);
        let log: Log = Arc::default();
        subscribe(&fx.registry, &log, "s1", false);

        publish(&fx, 1);
        publish(&fx, 2);
        let Fixture {
            sender,
            status,
            worker,
            ..
        } = fx;
        drop(sender);
        worker.run().await;

        assert_eq!(*log.lock().unwrap(), vec!["s1:1", "s1:2"]);
        assert_eq!(status.pending(), 0);
        assert_eq!(status.state(), WorkerState::Stopped);
    }
}
