//! Host-to-host request/response protocol.
//!
//! Hosts exchange `{toHostId, category, requestId, payload}` frames; a
//! category names a logical service on the receiving host. Each category
//! has at most one registered handler at a time, and an unhandled
//! category answers with a standard "no category" error frame instead of
//! dropping the request.

mod protocol;
mod router;

pub use protocol::{HostRequest, HostResponse, CODE_ERROR, CODE_NO_CATEGORY, CODE_OK};
pub use router::{CategoryHandler, CategoryRouter};
