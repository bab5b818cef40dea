//! Driver factory and instance multiplexer.
//!
//! A driver turns a declarative resource request ("an HTTP server on
//! host:port") into a shared, reference-counted handle. N callers asking
//! for the same logical resource share one underlying transport: requests
//! are keyed by a *match string* derived from their props, and the
//! transport is opened once and closed only when the last holder releases
//! its handle.
//!
//! The concrete transport (HTTP/WebSocket client or server) lives behind
//! the [`TransportAdapter`] collaborator interface; drivers differ only in
//! their [`DriverSpec`].

mod factory;
mod specs;
mod transport;

pub use factory::{DriverFactory, DriverSpec, InstanceHandle};
pub use specs::{ClientProps, HttpServerSpec, ServerProps, WsClientSpec};
pub use transport::{
    ConnectionId, EventKind, PortLedger, TransportAdapter, TransportEvent, TransportId,
};
