//! Entity kinds, manifests and the hook/context seams.
//!
//! An entity is anything the kernel manages: a driver factory, a
//! service, an app. The kernel never knows what an entity *does*; it
//! calls the entity's [`EntityHooks`] at the right lifecycle moments
//! and hands each hook the entity's [`EntityContext`] - the capability
//! bundle the entity was registered with. Capabilities are explicit:
//! an entity can only reach what its context carries.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use hearth_core::Result;

use crate::status::EntityStatus;

/// What class of entity this is. Boot initializes drivers first, then
/// services, then apps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Driver,
    Service,
    App,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Driver => "driver",
            EntityKind::Service => "service",
            EntityKind::App => "app",
        };
        write!(f, "{}", name)
    }
}

/// Static description of an entity: its identity plus the drivers and
/// services it declares it needs before it can start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub require_driver: Vec<String>,
    #[serde(default)]
    pub require_service: Vec<String>,
}

impl Manifest {
    /// A manifest with no declared dependencies.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            require_driver: Vec::new(),
            require_service: Vec::new(),
        }
    }
}

/// The capability bundle an entity runs against.
///
/// Whatever state an entity owns (a driver factory, a store handle, a
/// mount view) lives behind this trait. The kernel only drives the two
/// lifecycle edges it cares about; everything else is downcast-free
/// entity-private API reached through the hooks' shared reference.
#[async_trait]
pub trait EntityContext: Send + Sync {
    /// Bring the context's owned resources up. Runs before the
    /// entity's init hook.
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    /// Tear the context's owned resources down. Runs after the
    /// entity's destroy hook, even when that hook failed.
    async fn destroy(&self) -> Result<()> {
        Ok(())
    }
}

/// A context with no resources. For entities that are pure logic.
pub struct NullContext;

#[async_trait]
impl EntityContext for NullContext {}

/// Lifecycle callbacks an entity implements.
///
/// Every hook defaults to a no-op so entities only implement the
/// moments they care about. A hook returning `Err` moves the entity
/// into the matching error status; it never unwinds the kernel.
#[async_trait]
pub trait EntityHooks: Send + Sync {
    async fn on_init(&self, _ctx: &dyn EntityContext) -> Result<()> {
        Ok(())
    }

    async fn on_start(&self, _ctx: &dyn EntityContext) -> Result<()> {
        Ok(())
    }

    async fn on_stop(&self, _ctx: &dyn EntityContext) -> Result<()> {
        Ok(())
    }

    async fn on_destroy(&self, _ctx: &dyn EntityContext) -> Result<()> {
        Ok(())
    }
}

/// Hooks that do nothing at every lifecycle moment.
pub struct NoHooks;

#[async_trait]
impl EntityHooks for NoHooks {}

/// A registered entity as the manager tracks it. The kind lives in the
/// registry key.
pub(crate) struct Entity {
    pub(crate) manifest: Manifest,
    pub(crate) status: EntityStatus,
    pub(crate) context: Arc<dyn EntityContext>,
    pub(crate) hooks: Arc<dyn EntityHooks>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn manifest_wire_shape() {
        let manifest: Manifest = serde_json::from_value(json!({
            "name": "climate",
            "version": "1.2.0",
            "requireDriver": ["http-server"],
        }))
        .unwrap();

        assert_eq!(manifest.name, "climate");
        assert_eq!(manifest.require_driver, vec!["http-server".to_string()]);
        assert!(manifest.require_service.is_empty());
    }

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(EntityKind::Driver).unwrap(),
            json!("driver")
        );
        assert_eq!(EntityKind::App.to_string(), "app");
    }

    #[tokio::test]
    async fn default_hooks_and_context_are_no_ops() {
        let ctx = NullContext;
        assert!(ctx.init().await.is_ok());
        assert!(ctx.destroy().await.is_ok());

        let hooks = NoHooks;
        assert!(hooks.on_init(&ctx).await.is_ok());
        assert!(hooks.on_start(&ctx).await.is_ok());
        assert!(hooks.on_stop(&ctx).await.is_ok());
        assert!(hooks.on_destroy(&ctx).await.is_ok());
    }
}
