//! Concrete driver kinds: server and client transports with reuse.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use hearth_core::{Error, Result};

use crate::factory::DriverSpec;
use crate::transport::{EventKind, PortLedger, TransportAdapter, TransportId};

/// Props for a server-style driver ("an HTTP server on host:port").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerProps {
    pub host: String,
    pub port: u16,
}

/// HTTP/WebSocket server driver.
///
/// Requests match on `host:port`; readiness is the adapter's `Listening`
/// event for the freshly bound socket.
pub struct HttpServerSpec;

#[async_trait]
impl DriverSpec for HttpServerSpec {
    type Props = ServerProps;

    fn name(&self) -> &str {
        "http-server"
    }

    fn validate(&self, props: &ServerProps, ports: &PortLedger) -> Result<()> {
        if props.host.is_empty() {
            return Err(Error::Validation("server host must not be empty".to_string()));
        }
        if props.port == 0 {
            return Err(Error::Validation("server port must not be 0".to_string()));
        }
        if ports.is_busy(props.port) {
            return Err(Error::Validation(format!(
                "port {} is already in use",
                props.port
            )));
        }
        Ok(())
    }

    fn match_string(&self, props: &ServerProps) -> String {
        format!("{}:{}", props.host, props.port)
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

    async fn shutdown(&self, adapter: &dyn TransportAdapter, id: TransportId) -> Result<()> {
        adapter.stop_server(id).await
    }
}

/// Props for a client-style driver ("a WebSocket connection to this URL").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProps {
    pub url: String,
}

/// WebSocket/HTTP client driver.
///
/// Requests match on the normalized target URL; readiness is the
/// adapter's `Open` event once the handshake completes.
pub struct WsClientSpec;

#[async_trait]
impl DriverSpec for WsClientSpec {
    type Props = ClientProps;

    fn name(&self) -> &str {
        "ws-client"
    }

    fn validate(&self, props: &ClientProps, _ports: &PortLedger) -> Result<()> {
        let parsed = url::Url::parse(&props.url)
            .map_err(|err| Error::Validation(format!("invalid url '{}': {}", props.url, err)))?;
        match parsed.scheme() {
            "ws" | "wss" | "http" | "https" => Ok(()),
            other => Err(Error::Validation(format!(
                "unsupported url scheme '{}'",
                other
            ))),
        }
    }

    fn match_string(&self, props: &ClientProps) -> String {
        // Normalization collapses trivially different spellings of the
        // same target into one match string.
        url::Url::parse(&props.url)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| props.url.clone())
    }

    async fn open(
        &self,
        adapter: &dyn TransportAdapter,
        props: &ClientProps,
    ) -> Result<TransportId> {
        adapter.new_connection(&props.url).await
    }

    fn is_ready(&self, kind: &EventKind) -> bool {
        matches!(kind, EventKind::Open)
    }

    async fn shutdown(&self, adapter: &dyn TransportAdapter, id: TransportId) -> Result<()> {
        adapter.close(id).await
    }
}
