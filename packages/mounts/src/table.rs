//! The persisted mount point table.

use std::path::{Path as OsPath, PathBuf};
use std::sync::Arc;

use hearth_core::{ConfigStore, Error, Result, VPath};

use crate::graph::find_cycle;
use crate::point::{MountPoint, Namespace};

/// Reserved config document holding the mount point table.
pub const MOUNT_POINTS_DOC: &str = "system.mountPoints";

/// Where a logical path actually lives after mount substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    pub namespace: Namespace,
    pub path: VPath,
}

impl ResolvedLocation {
    /// Join the resolved location onto a physical root directory.
    ///
    /// External-namespace locations are the extension point storage
    /// adapters plug into; for those the caller picks the root of the
    /// external medium instead of the host data root.
    pub fn to_physical(&self, root: &OsPath) -> PathBuf {
        let mut physical = root.to_path_buf();
        for component in self.path.iter() {
            physical.push(component);
        }
        physical
    }
}

/// Single-writer owner of the mount point table.
///
/// All mutations validate first, then append/filter, then persist the
/// whole table. Accessors return copies; nothing hands out a reference
/// into the backing `Vec`.
pub struct MountTable {
    store: Arc<dyn ConfigStore>,
    points: Vec<MountPoint>,
}

impl MountTable {
    /// Load the table from its persisted document.
    ///
    /// A missing document yields an empty table.
    pub async fn load(store: Arc<dyn ConfigStore>) -> Result<Self> {
        let points = match store.load(MOUNT_POINTS_DOC).await? {
            Some(document) => serde_json::from_value(document)?,
            None => Vec::new(),
        };
        Ok(Self { store, points })
    }

    /// Register a mount point.
    ///
    /// Rejects root→root points, exact duplicates, and any point that
    /// would make the redirection graph cyclic. On rejection the table
    /// is unchanged and nothing is persisted.
    pub async fn register(&mut self, point: MountPoint) -> Result<()> {
        if point.is_root_to_root() {
            return Err(Error::Validation(format!(
                "mount point {} redirects root to root",
                point
            )));
        }

        if self.points.iter().any(|p| p.same_paths(&point)) {
            return Err(Error::DuplicateRegistration(format!(
                "mount point {}",
                point
            )));
        }

        let mut candidate = self.points.clone();
        candidate.push(point.clone());
        if let Some(node) = find_cycle(&candidate) {
            return Err(Error::CycleDetected(node));
        }

        tracing::debug!(point = %point, "registering mount point");
        self.points.push(point);
        self.persist().await
    }

    /// Remove every point whose src path matches, returning the count.
    pub async fn unregister_by_src_path(&mut self, path: &VPath) -> Result<usize> {
        self.unregister_where(|p| &p.src.path == path).await
    }

    /// Remove every point whose dest path matches, returning the count.
    pub async fn unregister_by_dest_path(&mut self, path: &VPath) -> Result<usize> {
        self.unregister_where(|p| &p.dest.path == path).await
    }

    async fn unregister_where<F>(&mut self, matches: F) -> Result<usize>
    where
        F: Fn(&MountPoint) -> bool,
    {
        let before = self.points.len();
        self.points.retain(|p| !matches(p));
        let removed = before - self.points.len();
        if removed > 0 {
            self.persist().await?;
        }
        Ok(removed)
    }

    /// Diagnostic: does the currently persisted table contain a cycle?
    ///
    /// Registration already forbids cycles; this catches out-of-band
    /// edits to the persisted document, e.g. at startup.
    pub fn has_cycle(&self) -> bool {
        find_cycle(&self.points).is_some()
    }

    /// All mount points, copied out.
    pub fn points(&self) -> Vec<MountPoint> {
        self.points.clone()
    }

    /// Mount points whose src lives in the given namespace, copied out.
    pub fn points_for(&self, namespace: Namespace) -> Vec<MountPoint> {
        self.points
            .iter()
            .filter(|p| p.src.namespace == namespace)
            .cloned()
            .collect()
    }

    /// Resolve a logical path against the table.
    ///
    /// The deepest registered `dest.path` that is a prefix of `logical`
    /// wins; its `src` location is substituted for the matched prefix.
    /// With no match the path stays in the root namespace untouched.
    pub fn resolve(&self, logical: &VPath) -> ResolvedLocation {
        let best = self
            .points
            .iter()
            .filter(|p| logical.starts_with(&p.dest.path))
            .max_by_key(|p| p.dest.path.len());

        match best {
            Some(point) => {
                // starts_with above guarantees the strip succeeds.
                let rest = logical
                    .strip_prefix(&point.dest.path)
                    .unwrap_or_else(VPath::root);
                ResolvedLocation {
                    namespace: point.src.namespace,
                    path: point.src.path.join(&rest),
                }
            }
            None => ResolvedLocation {
                namespace: Namespace::Root,
                path: logical.clone(),
            },
        }
    }

    async fn persist(&self) -> Result<()> {
        let document = serde_json::to_value(&self.points)?;
        self.store.save(MOUNT_POINTS_DOC, &document).await
    }
}
