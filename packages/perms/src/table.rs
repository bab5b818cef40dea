//! The persisted permission grant table.

use std::collections::BTreeMap;
use std::sync::Arc;

use hearth_core::{ConfigStore, Error, Result, VPath};

use crate::gate::{is_authorized, Action};

/// Reserved config document holding the grant table.
pub const PERMISSIONS_DOC: &str = "system.permissions";

/// Per-entity permission keys: `entityName -> permissionKey -> granted`.
type Grants = BTreeMap<String, BTreeMap<String, bool>>;

/// Single-writer owner of the permission grant table.
///
/// The table is persisted as one document; every mutation rewrites it
/// whole. Callers invoke [`PermissionTable::check_permissions`] before
/// any filesystem mutation or read.
pub struct PermissionTable {
    store: Arc<dyn ConfigStore>,
    grants: Grants,
}

impl PermissionTable {
    /// Load the table from its persisted document.
    ///
    /// A missing document yields an empty table (deny-by-default).
    pub async fn load(store: Arc<dyn ConfigStore>) -> Result<Self> {
        let grants = match store.load(PERMISSIONS_DOC).await? {
            Some(document) => serde_json::from_value(document)?,
            None => Grants::new(),
        };
        Ok(Self { store, grants })
    }

    /// Shallow-merge a partial update into an entity's grants and persist.
    ///
    /// Existing keys not named in `partial` are left alone.
    pub async fn save(
        &mut self,
        entity: &str,
        partial: BTreeMap<String, bool>,
    ) -> Result<()> {
        let entry = self.grants.entry(entity.to_string()).or_default();
        for (key, granted) in partial {
            entry.insert(key, granted);
        }
        self.persist().await
    }

    /// Remove the named keys from an entity's grants and persist.
    ///
    /// The entity's entry is pruned once it holds no keys.
    pub async fn delete(&mut self, entity: &str, keys: &[String]) -> Result<()> {
        if let Some(entry) = self.grants.get_mut(entity) {
            for key in keys {
                entry.remove(key);
            }
            if entry.is_empty() {
                self.grants.remove(entity);
            }
            self.persist().await?;
        }
        Ok(())
    }

    /// An entity's grants, copied out.
    pub fn grants_for(&self, entity: &str) -> BTreeMap<String, bool> {
        self.grants.get(entity).cloned().unwrap_or_default()
    }

    /// Authorize `action` on every path in the batch for `permit_for`.
    ///
    /// Fails on the first unauthorized path; a deny aborts the whole
    /// batch, so multi-path operations (`rename`, `cp`, `rm`) are
    /// all-or-nothing. `who_asks` is the entity making the call on
    /// `permit_for`'s behalf; it is carried for diagnostics only.
    pub fn check_permissions(
        &self,
        who_asks: &str,
        permit_for: &str,
        paths: &[VPath],
        action: Action,
    ) -> Result<()> {
        let entity_grants = self.grants.get(permit_for);
        let lookup = |key: &str| {
            entity_grants
                .and_then(|grants| grants.get(key))
                .copied()
                .unwrap_or(false)
        };

        for path in paths {
            if !is_authorized(&lookup, action, path) {
                tracing::debug!(
                    who_asks,
                    permit_for,
                    action = %action,
                    path = %path,
                    "permission denied"
                );
                return Err(Error::PermissionDenied {
                    who_asks: who_asks.to_string(),
                    permit_for: permit_for.to_string(),
                    action: action.as_str().to_string(),
                    path: path.to_string(),
                });
            }
        }
        Ok(())
    }

    async fn persist(&self) -> Result<()> {
        let document = serde_json::to_value(&self.grants)?;
        self.store.save(PERMISSIONS_DOC, &document).await
    }
}
