//! Transport IO adapter interface and event vocabulary.

use std::collections::BTreeSet;

use async_trait::async_trait;
use tokio::sync::mpsc;

use hearth_core::Result;

/// Opaque id for a transport (one server socket or one connection).
pub type TransportId = u64;

/// Id of a single connection accepted by a server transport.
pub type ConnectionId = u64;

/// An event emitted by a transport adapter.
#[derive(Debug, Clone)]
pub struct TransportEvent {
    /// The transport this event belongs to.
    pub id: TransportId,
    pub kind: EventKind,
}

/// The fixed event vocabulary adapters emit.
#[derive(Debug, Clone)]
pub enum EventKind {
    /// A server transport is bound and accepting.
    Listening,
    /// A server transport finished shutting down.
    ServerClosed,
    /// A server transport failed.
    ServerError { message: String },
    /// A server transport accepted a connection.
    NewConnection { connection: ConnectionId },
    /// A client transport finished its handshake.
    Open,
    /// A message arrived. `connection` is set for server-side transports.
    Message {
        connection: Option<ConnectionId>,
        payload: Vec<u8>,
    },
    /// A connection closed.
    Close { connection: Option<ConnectionId> },
    /// A connection-level failure.
    Error { message: String },
    /// The peer answered the handshake with something unexpected.
    UnexpectedResponse { status: u16 },
}

impl EventKind {
    /// Readiness/teardown signals the factory consumes internally and
    /// never re-emits to instance-level listeners.
    pub fn is_lifecycle_signal(&self) -> bool {
        matches!(
            self,
            EventKind::Listening | EventKind::ServerClosed | EventKind::Open
        )
    }
}

/// A transport IO adapter (HTTP/WebSocket client or server).
///
/// Adapters own the actual sockets and wire codecs; Hearth only sees
/// opaque transport ids and the event stream. One factory subscribes to
/// the stream exactly once and fans events out to instances.
#[async_trait]
pub trait TransportAdapter: Send + Sync {
    /// Bind a server transport. Readiness is signalled by a later
    /// `Listening` event carrying the returned id.
    async fn new_server(&self, host: &str, port: u16) -> Result<TransportId>;

    /// Open a client connection. Readiness is signalled by a later
    /// `Open` event carrying the returned id.
    async fn new_connection(&self, url: &str) -> Result<TransportId>;

    /// Send a payload on a transport (to one connection for servers).
    async fn send(
        &self,
        id: TransportId,
        connection: Option<ConnectionId>,
        payload: Vec<u8>,
    ) -> Result<()>;

    /// Stop a server transport.
    async fn stop_server(&self, id: TransportId) -> Result<()>;

    /// Close a client transport.
    async fn close(&self, id: TransportId) -> Result<()>;

    /// Take the adapter's event stream.
    ///
    /// Returns `None` if the stream was already taken; there is exactly
    /// one consumer (the owning factory).
    fn take_events(&self) -> Option<mpsc::UnboundedReceiver<TransportEvent>>;
}

/// Tracks which local ports are claimed by server instances.
///
/// Driver validation consults the ledger so two factories (or two
/// instances with different match strings) cannot race for one port.
#[derive(Debug, Default)]
pub struct PortLedger {
    busy: BTreeSet<u16>,
}

impl PortLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a port. Returns `false` if it was already busy.
    pub fn mark(&mut self, port: u16) -> bool {
        self.busy.insert(port)
    }

    /// Release a claimed port.
    pub fn release(&mut self, port: u16) {
        self.busy.remove(&port);
    }

    pub fn is_busy(&self, port: u16) -> bool {
        self.busy.contains(&port)
    }
}
