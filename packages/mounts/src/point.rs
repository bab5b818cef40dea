//! Mount point types.

use std::fmt;

use serde::{Deserialize, Serialize};

use hearth_core::VPath;

/// Which namespace an endpoint lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// The host's own virtual root tree.
    Root,
    /// An externally-mounted namespace (removable media, remote share).
    External,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Root => write!(f, "root"),
            Namespace::External => write!(f, "external"),
        }
    }
}

/// One end of a mount point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(rename = "type")]
    pub namespace: Namespace,
    pub path: VPath,
}

impl Endpoint {
    pub fn new(namespace: Namespace, path: VPath) -> Self {
        Self { namespace, path }
    }

    /// Graph node key: `namespace:path`.
    pub(crate) fn node_key(&self) -> String {
        format!("{}:{}", self.namespace, self.path)
    }
}

/// A redirection from `src` (where the data actually lives) to `dest`
/// (where it appears).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountPoint {
    pub src: Endpoint,
    pub dest: Endpoint,
}

impl MountPoint {
    pub fn new(src: Endpoint, dest: Endpoint) -> Self {
        Self { src, dest }
    }

    /// Both endpoints in the root namespace - a meaningless self-loop at
    /// the namespace level.
    pub(crate) fn is_root_to_root(&self) -> bool {
        self.src.namespace == Namespace::Root && self.dest.namespace == Namespace::Root
    }

    /// Same (src.path, dest.path) pair as another point.
    pub(crate) fn same_paths(&self, other: &MountPoint) -> bool {
        self.src.path == other.src.path && self.dest.path == other.dest.path
    }
}

impl fmt::Display for MountPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.src.node_key(), self.dest.node_key())
    }
}
