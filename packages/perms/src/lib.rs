//! Permission gate for Hearth filesystem operations.
//!
//! Every filesystem mutation or read is authorized against a persisted
//! grant table before it runs. Grants are monotonic: a grant on a path
//! authorizes that exact path and every descendant (never ancestors),
//! and a `write` grant implies `read` on the same subtree.
//!
//! The decision core ([`gate`]) is a pure function over a lookup
//! closure; [`PermissionTable`] owns the persisted table and pre-binds
//! the lookup - an explicit wrapper, no runtime reflection.

mod gate;
mod table;

pub use gate::{is_authorized, permission_key, Action};
pub use table::{PermissionTable, PERMISSIONS_DOC};
