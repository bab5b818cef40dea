//! Generic driver factory with match-string instance reuse.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{timeout_at, Instant};

use hearth_core::{Error, Result};

use crate::transport::{EventKind, PortLedger, TransportAdapter, TransportEvent, TransportId};

/// How long `acquire` waits for a transport's readiness event.
const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-instance event fan-out buffer.
const INSTANCE_EVENT_CAPACITY: usize = 64;

/// What makes one driver kind different from another.
///
/// The factory owns the slot table, reuse accounting and event fan-out;
/// the spec contributes props validation, the match string, and how to
/// open/close its flavor of transport.
#[async_trait]
pub trait DriverSpec: Send + Sync + 'static {
    /// Caller-supplied request parameters.
    type Props: Clone + Send + Sync + DeserializeOwned;

    /// Driver kind name, for logs.
    fn name(&self) -> &str;

    /// Reject malformed props before anything is opened.
    fn validate(&self, props: &Self::Props, ports: &PortLedger) -> Result<()>;

    /// Two requests with the same match string share one transport.
    fn match_string(&self, props: &Self::Props) -> String;

    /// The local port this instance claims, if any.
    fn port(&self, _props: &Self::Props) -> Option<u16> {
        None
    }

    /// Open the underlying transport.
    async fn open(
        &self,
        adapter: &dyn TransportAdapter,
        props: &Self::Props,
    ) -> Result<TransportId>;

    /// Does this event complete the readiness handshake?
    fn is_ready(&self, kind: &EventKind) -> bool;

    /// Per-instance setup after the slot is registered.
    async fn init_instance(
        &self,
        _adapter: &dyn TransportAdapter,
        _props: &Self::Props,
        _id: TransportId,
    ) -> Result<()> {
        Ok(())
    }

    /// Tear the underlying transport down.
    async fn shutdown(&self, adapter: &dyn TransportAdapter, id: TransportId) -> Result<()>;
}

/// A caller's capability handle into a driver instance.
///
/// Handles are the only thing callers ever hold; the instance table
/// stays inside the factory. Dropping a handle without calling
/// [`DriverFactory::release`] leaks a reference on purpose - teardown
/// is explicit.
pub struct InstanceHandle {
    /// Slot id inside the owning factory.
    pub instance_id: usize,
    /// The shared transport this handle taps.
    pub transport: TransportId,
    /// The match string the instance was created under.
    pub match_string: String,
    events: broadcast::Receiver<TransportEvent>,
}

impl InstanceHandle {
    /// Receive the next instance-level event.
    ///
    /// Returns `None` once the instance is gone. A slow consumer that
    /// lags behind the fan-out buffer skips to the oldest retained
    /// event.
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        loop {
            match self.events.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "instance event consumer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`InstanceHandle::next_event`].
    pub fn try_next_event(&mut self) -> Option<TransportEvent> {
        loop {
            match self.events.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "instance event consumer lagged");
                }
                Err(_) => return None,
            }
        }
    }
}

struct InstanceSlot<S: DriverSpec> {
    props: S::Props,
    match_string: String,
    transport: TransportId,
    refs: usize,
    events: broadcast::Sender<TransportEvent>,
}

/// Factory owning every instance of one driver kind.
///
/// Created once per driver kind and owned by the kernel. The factory
/// subscribes to its adapter's event stream exactly once; everything
/// instances see goes through [`DriverFactory::pump_events`].
pub struct DriverFactory<S: DriverSpec> {
    spec: S,
    adapter: Arc<dyn TransportAdapter>,
    events: mpsc::UnboundedReceiver<TransportEvent>,
    config: Option<JsonValue>,
    slots: Vec<Option<InstanceSlot<S>>>,
    ports: PortLedger,
    ready_timeout: Duration,
}

impl<S: DriverSpec> DriverFactory<S> {
    /// Create a factory over an adapter, taking its event stream.
    pub fn new(spec: S, adapter: Arc<dyn TransportAdapter>) -> Result<Self> {
        let events = adapter.take_events().ok_or_else(|| {
            Error::Transport(format!(
                "adapter event stream for driver '{}' already taken",
                spec.name()
            ))
        })?;
        Ok(Self {
            spec,
            adapter,
            events,
            config: None,
            slots: Vec::new(),
            ports: PortLedger::new(),
            ready_timeout: DEFAULT_READY_TIMEOUT,
        })
    }

    /// Override the readiness wait budget.
    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    /// Store the merged configuration, once per factory lifetime.
    ///
    /// Synced (host-group) keys win over local ones. A second call is a
    /// dev-time misuse signal: warn and keep the first configuration.
    pub fn init(&mut self, local: JsonValue, synced: JsonValue) {
        if self.config.is_some() {
            tracing::warn!(driver = self.spec.name(), "factory already configured");
            return;
        }
        self.config = Some(merge_config(local, synced));
    }

    /// The merged configuration, if `init` has run.
    pub fn config(&self) -> Option<&JsonValue> {
        self.config.as_ref()
    }

    /// Number of live instances.
    pub fn instance_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Acquire a handle for the given props.
    ///
    /// If a live instance shares the props' match string, its reference
    /// count is bumped and no new transport is opened. The reuse lookup
    /// runs before props validation: the port a matching instance holds
    /// belongs to the very request being served, so the ledger must not
    /// reject it. Otherwise the spec validates, opens a transport, the
    /// factory awaits its readiness event within a bounded wait, and
    /// the instance lands in the next free slot.
    pub async fn acquire(&mut self, props: S::Props) -> Result<InstanceHandle> {
        let match_string = self.spec.match_string(&props);
        if let Some((id, slot)) = self
            .slots
            .iter_mut()
            .enumerate()
            .filter_map(|(id, s)| s.as_mut().map(|s| (id, s)))
            .find(|(_, s)| s.match_string == match_string)
        {
            slot.refs += 1;
            tracing::debug!(
                driver = self.spec.name(),
                %match_string,
                refs = slot.refs,
                "reusing driver instance"
            );
            return Ok(InstanceHandle {
                instance_id: id,
                transport: slot.transport,
                match_string,
                events: slot.events.subscribe(),
            });
        }

        self.spec.validate(&props, &self.ports)?;

        let transport = self.spec.open(self.adapter.as_ref(), &props).await?;
        self.await_ready(transport).await?;

        if let Some(port) = self.spec.port(&props) {
            self.ports.mark(port);
        }

        let (events, _) = broadcast::channel(INSTANCE_EVENT_CAPACITY);
        let handle_events = events.subscribe();
        let slot = InstanceSlot {
            props: props.clone(),
            match_string: match_string.clone(),
            transport,
            refs: 1,
            events,
        };

        let instance_id = match self.slots.iter().position(|s| s.is_none()) {
            Some(free) => {
                self.slots[free] = Some(slot);
                free
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        };

        if let Err(err) = self
            .spec
            .init_instance(self.adapter.as_ref(), &props, transport)
            .await
        {
            // Unwind: a half-initialized instance must never be reused.
            self.slots[instance_id] = None;
            if let Some(port) = self.spec.port(&props) {
                self.ports.release(port);
            }
            if let Err(shutdown_err) =
                self.spec.shutdown(self.adapter.as_ref(), transport).await
            {
                tracing::warn!(
                    driver = self.spec.name(),
                    transport,
                    error = %shutdown_err,
                    "cleanup after failed instance init failed"
                );
            }
            self.drain_lifecycle_signals();
            return Err(err);
        }

        tracing::debug!(
            driver = self.spec.name(),
            %match_string,
            instance_id,
            transport,
            "created driver instance"
        );

        Ok(InstanceHandle {
            instance_id,
            transport,
            match_string,
            events: handle_events,
        })
    }

    /// Acquire from untyped props, e.g. a declarative request document.
    pub async fn acquire_value(&mut self, props: JsonValue) -> Result<InstanceHandle> {
        let props: S::Props = serde_json::from_value(props)
            .map_err(|err| Error::Validation(format!("malformed driver props: {}", err)))?;
        self.acquire(props).await
    }

    /// Release a handle's reference.
    ///
    /// At zero references the underlying transport is shut down and the
    /// slot is spliced out. Adapter teardown failures propagate - this
    /// layer does not swallow.
    pub async fn release(&mut self, handle: InstanceHandle) -> Result<()> {
        let slot = self
            .slots
            .get_mut(handle.instance_id)
            .and_then(|s| s.as_mut())
            .ok_or_else(|| {
                Error::NotFound(format!("driver instance {}", handle.instance_id))
            })?;

        slot.refs -= 1;
        if slot.refs > 0 {
            tracing::debug!(
                driver = self.spec.name(),
                instance_id = handle.instance_id,
                refs = slot.refs,
                "released driver handle, instance still shared"
            );
            return Ok(());
        }

        let transport = slot.transport;
        let port = self.spec.port(&slot.props);
        self.spec.shutdown(self.adapter.as_ref(), transport).await?;
        if let Some(port) = port {
            self.ports.release(port);
        }
        self.slots[handle.instance_id] = None;
        self.drain_lifecycle_signals();
        Ok(())
    }

    /// Tear down every instance.
    ///
    /// All instances are attempted; the first adapter failure is
    /// reported after the sweep. Slots that shut down cleanly are
    /// spliced out either way.
    pub async fn destroy(&mut self, reason: &str) -> Result<()> {
        tracing::debug!(driver = self.spec.name(), reason, "destroying driver factory");

        let mut first_error = None;
        for id in 0..self.slots.len() {
            let Some(slot) = self.slots[id].take() else {
                continue;
            };
            match self.spec.shutdown(self.adapter.as_ref(), slot.transport).await {
                Ok(()) => {
                    if let Some(port) = self.spec.port(&slot.props) {
                        self.ports.release(port);
                    }
                }
                Err(err) => {
                    // Leave the slot out of the table but surface the failure.
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }
        self.drain_lifecycle_signals();

        match first_error {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    /// Drain the adapter event stream and fan events out to instances.
    ///
    /// Lifecycle signals (`Listening`/`ServerClosed`/`Open`) are
    /// consumed here and never reach instance listeners; events for
    /// unknown transport ids are logged as warnings, not errors.
    pub fn pump_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.dispatch(event);
        }
    }

    fn dispatch(&self, event: TransportEvent) {
        if event.kind.is_lifecycle_signal() {
            tracing::debug!(
                driver = self.spec.name(),
                transport = event.id,
                kind = ?event.kind,
                "lifecycle signal consumed"
            );
            return;
        }

        let owner = self
            .slots
            .iter()
            .flatten()
            .find(|s| s.transport == event.id);
        match owner {
            Some(slot) => {
                // No receivers is fine; the handle may not be listening.
                let _ = slot.events.send(event);
            }
            None => {
                tracing::warn!(
                    driver = self.spec.name(),
                    transport = event.id,
                    kind = ?event.kind,
                    "event for unknown transport id"
                );
            }
        }
    }

    /// Wait for the readiness event of a freshly opened transport.
    ///
    /// Events for other transports arriving meanwhile are dispatched as
    /// usual; a readiness failure (`ServerError`) or the budget expiring
    /// fails the acquire.
    async fn await_ready(&mut self, transport: TransportId) -> Result<()> {
        let deadline = Instant::now() + self.ready_timeout;
        loop {
            let event = match timeout_at(deadline, self.events.recv()).await {
                Ok(Some(event)) => event,
                Ok(None) => {
                    return Err(Error::Transport(format!(
                        "adapter event stream closed while awaiting transport {}",
                        transport
                    )))
                }
                Err(_) => {
                    // Best-effort cleanup of the half-open transport.
                    if let Err(err) = self.spec.shutdown(self.adapter.as_ref(), transport).await
                    {
                        tracing::warn!(
                            driver = self.spec.name(),
                            transport,
                            error = %err,
                            "cleanup after readiness timeout failed"
                        );
                    }
                    return Err(Error::Timeout {
                        budget: self.ready_timeout,
                        context: format!("readiness of transport {}", transport),
                    });
                }
            };

            if event.id != transport {
                self.dispatch(event);
                continue;
            }

            match event.kind {
                kind if self.spec.is_ready(&kind) => return Ok(()),
                EventKind::ServerError { message } | EventKind::Error { message } => {
                    return Err(Error::Transport(message));
                }
                EventKind::UnexpectedResponse { status } => {
                    return Err(Error::Transport(format!(
                        "unexpected handshake response: {}",
                        status
                    )));
                }
                other => {
                    tracing::debug!(
                        driver = self.spec.name(),
                        transport,
                        kind = ?other,
                        "ignoring pre-ready event"
                    );
                }
            }
        }
    }

    /// Swallow lifecycle signals queued by a teardown, so they never
    /// surface as unknown-id warnings on the next pump.
    fn drain_lifecycle_signals(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            if !event.kind.is_lifecycle_signal() {
                self.dispatch(event);
            }
        }
    }
}

/// Shallow-merge two config objects, synced keys winning.
fn merge_config(local: JsonValue, synced: JsonValue) -> JsonValue {
    match (local, synced) {
        (JsonValue::Object(mut local), JsonValue::Object(synced)) => {
            for (key, value) in synced {
                local.insert(key, value);
            }
            JsonValue::Object(local)
        }
        (local, JsonValue::Null) => local,
        (_, synced) => synced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specs::{ClientProps, HttpServerSpec, ServerProps, WsClientSpec};
    use crate::transport::mock::MockTransport;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn server_factory(adapter: Arc<MockTransport>) -> DriverFactory<HttpServerSpec> {
        DriverFactory::new(HttpServerSpec, adapter).unwrap()
    }

    fn props(host: &str, port: u16) -> ServerProps {
        ServerProps {
            host: host.to_string(),
            port,
        }
    }

    #[tokio::test]
    async fn identical_props_share_one_transport() {
        let adapter = Arc::new(MockTransport::new());
        let mut factory = server_factory(adapter.clone());

        let a = factory.acquire(props("localhost", 8080)).await.unwrap();
        let b = factory.acquire(props("localhost", 8080)).await.unwrap();

        // Exactly one server was opened, hence one listening event.
        assert_eq!(adapter.listening_count(), 1);
        assert_eq!(a.transport, b.transport);
        assert_eq!(a.instance_id, b.instance_id);
        assert_eq!(factory.instance_count(), 1);
    }

    #[tokio::test]
    async fn different_props_open_separate_transports() {
        let adapter = Arc::new(MockTransport::new());
        let mut factory = server_factory(adapter.clone());

        let a = factory.acquire(props("localhost", 8080)).await.unwrap();
        let b = factory.acquire(props("localhost", 9090)).await.unwrap();

        assert_eq!(adapter.listening_count(), 2);
        assert_ne!(a.transport, b.transport);
        assert_eq!(factory.instance_count(), 2);
    }

    #[tokio::test]
    async fn release_keeps_shared_transport_until_last_holder() {
        let adapter = Arc::new(MockTransport::new());
        let mut factory = server_factory(adapter.clone());

        let a = factory.acquire(props("localhost", 8080)).await.unwrap();
        let b = factory.acquire(props("localhost", 8080)).await.unwrap();
        let transport = a.transport;

        factory.release(a).await.unwrap();
        assert!(adapter.stopped.lock().unwrap().is_empty());
        assert_eq!(factory.instance_count(), 1);

        factory.release(b).await.unwrap();
        assert_eq!(adapter.stopped.lock().unwrap().as_slice(), &[transport]);
        assert_eq!(factory.instance_count(), 0);
    }

    #[tokio::test]
    async fn released_port_can_be_reacquired() {
        let adapter = Arc::new(MockTransport::new());
        let mut factory = server_factory(adapter.clone());

        let a = factory.acquire(props("localhost", 8080)).await.unwrap();
        factory.release(a).await.unwrap();

        factory.acquire(props("localhost", 8080)).await.unwrap();
        assert_eq!(adapter.listening_count(), 2);
    }

    #[tokio::test]
    async fn reacquire_is_not_blocked_by_own_port_claim() {
        let adapter = Arc::new(MockTransport::new());
        let mut factory = server_factory(adapter.clone());

        let a = factory.acquire(props("localhost", 8080)).await.unwrap();
        // The matching request must reach the reuse path, not trip over
        // the port its own instance claimed.
        let b = factory.acquire(props("localhost", 8080)).await.unwrap();
        assert_eq!(a.transport, b.transport);
        assert_eq!(factory.instance_count(), 1);
    }

    #[tokio::test]
    async fn busy_port_rejected_for_different_match_string() {
        let adapter = Arc::new(MockTransport::new());
        let mut factory = server_factory(adapter);

        factory.acquire(props("127.0.0.1", 8080)).await.unwrap();

        // Same port, different host: not reusable, and the port is taken.
        let result = factory.acquire(props("0.0.0.0", 8080)).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn malformed_props_value_rejected() {
        let adapter = Arc::new(MockTransport::new());
        let mut factory = server_factory(adapter);

        let result = factory.acquire_value(json!({"host": 42})).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    struct FlakyInitSpec {
        fail_first: AtomicBool,
    }

    #[async_trait]
    impl DriverSpec for FlakyInitSpec {
        type Props = ServerProps;

        fn name(&self) -> &str {
            "flaky-server"
        }

        fn validate(&self, props: &ServerProps, ports: &PortLedger) -> Result<()> {
            HttpServerSpec.validate(props, ports)
        }

        fn match_string(&self, props: &ServerProps) -> String {
            HttpServerSpec.match_string(props)
        }

        fn port(&self, props: &ServerProps) -> Option<u16> {
            Some(props.port)
        }

        async fn open(
            &self,
            adapter: &dyn TransportAdapter,
            props: &ServerProps,
        ) -> Result<TransportId> {
            adapter.new_server(&props.host, props.port).await
        }

        fn is_ready(&self, kind: &EventKind) -> bool {
            matches!(kind, EventKind::Listening)
        }

        async fn init_instance(
            &self,
            _adapter: &dyn TransportAdapter,
            _props: &ServerProps,
            _id: TransportId,
        ) -> Result<()> {
            if self.fail_first.swap(false, Ordering::SeqCst) {
                Err(Error::Transport("instance setup failed".to_string()))
            } else {
                Ok(())
            }
        }

        async fn shutdown(&self, adapter: &dyn TransportAdapter, id: TransportId) -> Result<()> {
            adapter.stop_server(id).await
        }
    }

    #[tokio::test]
    async fn failed_instance_init_unwinds_slot_and_port() {
        let adapter = Arc::new(MockTransport::new());
        let spec = FlakyInitSpec {
            fail_first: AtomicBool::new(true),
        };
        let mut factory = DriverFactory::new(spec, adapter.clone()).unwrap();

        let result = factory.acquire(props("localhost", 8080)).await;
        assert!(matches!(result, Err(Error::Transport(_))));

        // Nothing to reuse: no slot, no port claim, transport torn down.
        assert_eq!(factory.instance_count(), 0);
        assert_eq!(adapter.stopped.lock().unwrap().len(), 1);

        // A retry opens a fresh transport instead of the failed one.
        let handle = factory.acquire(props("localhost", 8080)).await.unwrap();
        assert_eq!(adapter.listening_count(), 2);
        assert_eq!(factory.instance_count(), 1);
        assert_ne!(handle.transport, adapter.stopped.lock().unwrap()[0]);
    }

    #[tokio::test]
    async fn readiness_timeout_fails_acquire() {
        let adapter = Arc::new(MockTransport::without_ready_events());
        let mut factory =
            server_factory(adapter.clone()).with_ready_timeout(Duration::from_millis(50));

        let result = factory.acquire(props("localhost", 8080)).await;
        assert!(matches!(result, Err(Error::Timeout { .. })));
        assert_eq!(factory.instance_count(), 0);

        // The half-open transport was cleaned up.
        assert_eq!(adapter.stopped.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn destroy_propagates_adapter_failure() {
        let adapter = Arc::new(MockTransport::new());
        let mut factory = server_factory(adapter.clone());
        factory.acquire(props("localhost", 8080)).await.unwrap();

        adapter.fail_shutdown();
        let result = factory.destroy("shutdown test").await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn destroy_tears_down_all_instances() {
        let adapter = Arc::new(MockTransport::new());
        let mut factory = server_factory(adapter.clone());
        factory.acquire(props("localhost", 8080)).await.unwrap();
        factory.acquire(props("localhost", 9090)).await.unwrap();

        factory.destroy("host stopping").await.unwrap();
        assert_eq!(factory.instance_count(), 0);
        assert_eq!(adapter.stopped.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn events_fan_out_to_owning_instance() {
        let adapter = Arc::new(MockTransport::new());
        let mut factory = server_factory(adapter.clone());
        let mut handle = factory.acquire(props("localhost", 8080)).await.unwrap();

        adapter.emit(
            handle.transport,
            EventKind::Message {
                connection: Some(7),
                payload: b"hello".to_vec(),
            },
        );
        factory.pump_events();

        let event = handle.try_next_event().expect("message should arrive");
        assert!(matches!(
            event.kind,
            EventKind::Message { connection: Some(7), .. }
        ));
    }

    #[tokio::test]
    async fn lifecycle_signals_not_forwarded_to_instances() {
        let adapter = Arc::new(MockTransport::new());
        let mut factory = server_factory(adapter.clone());
        let mut handle = factory.acquire(props("localhost", 8080)).await.unwrap();

        adapter.emit(handle.transport, EventKind::Listening);
        factory.pump_events();

        assert!(handle.try_next_event().is_none());
    }

    #[tokio::test]
    async fn unknown_transport_id_is_warned_not_fatal() {
        let adapter = Arc::new(MockTransport::new());
        let mut factory = server_factory(adapter.clone());
        factory.acquire(props("localhost", 8080)).await.unwrap();

        adapter.emit(
            999,
            EventKind::Message {
                connection: None,
                payload: Vec::new(),
            },
        );
        // Must not panic or error; the event is dropped with a warning.
        factory.pump_events();
    }

    #[tokio::test]
    async fn client_driver_reuses_by_url() {
        let adapter = Arc::new(MockTransport::new());
        let mut factory = DriverFactory::new(WsClientSpec, adapter.clone()).unwrap();

        let a = factory
            .acquire(ClientProps {
                url: "ws://hub.local:9000/rpc".to_string(),
            })
            .await
            .unwrap();
        let b = factory
            .acquire(ClientProps {
                url: "ws://hub.local:9000/rpc".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(adapter.connections.lock().unwrap().len(), 1);
        assert_eq!(a.transport, b.transport);
    }

    #[tokio::test]
    async fn init_merges_config_once() {
        let adapter = Arc::new(MockTransport::new());
        let mut factory = server_factory(adapter);

        factory.init(
            json!({"timeout": 30, "host": "localhost"}),
            json!({"timeout": 60}),
        );
        assert_eq!(
            factory.config(),
            Some(&json!({"timeout": 60, "host": "localhost"}))
        );

        // Second init is ignored with a warning.
        factory.init(json!({"timeout": 5}), JsonValue::Null);
        assert_eq!(
            factory.config(),
            Some(&json!({"timeout": 60, "host": "localhost"}))
        );
    }
}
