//! Category registry and request dispatch.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use hearth_core::{Error, Result};

use crate::protocol::{HostRequest, HostResponse, CODE_ERROR};

/// A handler answering requests for one category.
#[async_trait]
pub trait CategoryHandler: Send + Sync {
    /// Produce the response payload for a request.
    ///
    /// Errors are wrapped into an error frame with [`CODE_ERROR`]; they
    /// are answered, never propagated to the transport layer.
    async fn handle(&self, request: &HostRequest) -> Result<JsonValue>;
}

/// Routes incoming requests to the handler registered for their
/// category. At most one handler per category at a time.
#[derive(Default)]
pub struct CategoryRouter {
    handlers: BTreeMap<String, Arc<dyn CategoryHandler>>,
}

impl CategoryRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for a category.
    ///
    /// A second registration for the same category fails; the first
    /// handler stays in place.
    pub fn register(&mut self, category: &str, handler: Arc<dyn CategoryHandler>) -> Result<()> {
        if self.handlers.contains_key(category) {
            return Err(Error::DuplicateRegistration(format!(
                "protocol category '{}'",
                category
            )));
        }
        self.handlers.insert(category.to_string(), handler);
        Ok(())
    }

    /// Remove a category's handler, freeing the slot for re-registration.
    pub fn unregister(&mut self, category: &str) -> bool {
        self.handlers.remove(category).is_some()
    }

    /// Registered category names.
    pub fn categories(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    /// Dispatch a request, always producing a response frame.
    pub async fn dispatch(&self, request: &HostRequest) -> HostResponse {
        let Some(handler) = self.handlers.get(&request.category) else {
            tracing::debug!(category = request.category, "request for unhandled category");
            return HostResponse::no_category(request);
        };

        match handler.handle(request).await {
            Ok(payload) => HostResponse::ok(request, payload),
            Err(err) => HostResponse::error(request, CODE_ERROR, err.to_string()),
        }
    }
}
