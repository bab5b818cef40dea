//! Wire frames for the host-to-host protocol.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// The handler produced a response.
pub const CODE_OK: u16 = 200;
/// No handler is registered for the request's category.
pub const CODE_NO_CATEGORY: u16 = 404;
/// The handler failed.
pub const CODE_ERROR: u16 = 500;

/// A request frame sent to another host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostRequest {
    pub to_host_id: String,
    pub category: String,
    pub request_id: u64,
    pub payload: JsonValue,
}

/// A response frame answering a [`HostRequest`].
///
/// Exactly one of `payload`/`error` is set, mirrored by `code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostResponse {
    pub to_host_id: String,
    pub category: String,
    pub request_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub code: u16,
}

impl HostResponse {
    /// A success response answering `request`.
    pub fn ok(request: &HostRequest, payload: JsonValue) -> Self {
        Self {
            to_host_id: request.to_host_id.clone(),
            category: request.category.clone(),
            request_id: request.request_id,
            payload: Some(payload),
            error: None,
            code: CODE_OK,
        }
    }

    /// An error response answering `request`.
    pub fn error(request: &HostRequest, code: u16, message: impl Into<String>) -> Self {
        Self {
            to_host_id: request.to_host_id.clone(),
            category: request.category.clone(),
            request_id: request.request_id,
            payload: None,
            error: Some(message.into()),
            code,
        }
    }

    /// The standard answer for an unhandled category.
    pub fn no_category(request: &HostRequest) -> Self {
        Self::error(
            request,
            CODE_NO_CATEGORY,
            format!("no handler for category '{}'", request.category),
        )
    }
}
