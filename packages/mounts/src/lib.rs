//! Mount point resolver for Hearth virtual namespaces.
//!
//! A mount point redirects one namespace location to another - typically
//! exposing an externally-mounted directory inside the root tree. The
//! resolver maintains the persisted redirection table and statically
//! forbids redirection cycles: a point that would close a loop in the
//! directed src→dest graph is rejected before it is ever persisted.
//!
//! The table is a process-wide singleton behind a single-writer owner
//! ([`MountTable`]); accessors hand out copies, never references into the
//! backing structure.

mod graph;
mod point;
mod table;

pub use point::{Endpoint, MountPoint, Namespace};
pub use table::{MountTable, ResolvedLocation, MOUNT_POINTS_DOC};
