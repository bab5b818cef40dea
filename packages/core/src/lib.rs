//! Core Hearth: shared types for the platform micro-kernel.
//!
//! This layer holds what every other Hearth crate needs:
//! - `VPath`: validated absolute virtual path
//! - `Error`: the workspace-wide error taxonomy
//! - `ConfigStore`: whole-document persisted configuration seam
//! - `FileAdapter`: the virtual filesystem collaborator interface
//!
//! Hearth crates never talk to the OS directly; everything goes through
//! the seams defined here.

mod config;
mod error;
mod fs;
mod path;

pub use config::{ConfigStore, DiskConfigStore, MemoryConfigStore};
pub use error::{Error, PathFailure, Result};
pub use fs::{settle_batch, FileAccess, FileAdapter, FileStat};
pub use path::{PathError, VPath};
