//! Entity registry and lifecycle execution.
//!
//! The manager owns every registered entity and drives their hooks in
//! settle-all batches: a batch spawns one task per eligible entity,
//! waits for all of them under a shared deadline, and applies each
//! outcome to the state machine as it lands. A hook that fails moves
//! only its own entity into an error status; a hook that outlives the
//! deadline is left running detached and reported as timed out. The
//! batch never aborts in-flight hooks.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};

use hearth_core::{Error, Result};

use crate::entity::{Entity, EntityContext, EntityHooks, EntityKind, Manifest};
use crate::status::{EntityStatus, LifecycleEvent};

/// Outcome of one settle-all batch over a set of entities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhaseReport {
    /// Entities whose hook returned `Ok` within the budget.
    pub completed: Vec<String>,
    /// Entities whose hook returned `Err`, with the error message.
    pub failed: Vec<(String, String)>,
    /// Entities whose hook was still running when the budget expired.
    pub timed_out: Vec<String>,
}

impl PhaseReport {
    /// True when every entity in the batch completed cleanly.
    pub fn fully_settled(&self) -> bool {
        self.failed.is_empty() && self.timed_out.is_empty()
    }
}

/// Which hook a settle-all batch runs.
#[derive(Clone, Copy)]
enum HookPhase {
    Init,
    Start,
    Stop,
}

impl HookPhase {
    fn entry_event(self) -> LifecycleEvent {
        match self {
            HookPhase::Init => LifecycleEvent::InitRequested,
            HookPhase::Start => LifecycleEvent::StartRequested,
            HookPhase::Stop => LifecycleEvent::StopRequested,
        }
    }

    fn success_event(self) -> LifecycleEvent {
        match self {
            HookPhase::Init => LifecycleEvent::InitSucceeded,
            HookPhase::Start => LifecycleEvent::StartSucceeded,
            HookPhase::Stop => LifecycleEvent::StopSucceeded,
        }
    }

    fn failure_event(self, message: String) -> LifecycleEvent {
        match self {
            HookPhase::Init => LifecycleEvent::InitFailed(message),
            HookPhase::Start => LifecycleEvent::StartFailed(message),
            HookPhase::Stop => LifecycleEvent::StopFailed(message),
        }
    }

    fn name(self) -> &'static str {
        match self {
            HookPhase::Init => "init",
            HookPhase::Start => "start",
            HookPhase::Stop => "stop",
        }
    }
}

/// Registry of all entities on the host, keyed by kind and name.
#[derive(Default)]
pub struct EntityManager {
    entities: BTreeMap<(EntityKind, String), Entity>,
}

impl EntityManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity under its manifest name. The entity starts
    /// in `Loaded` and does nothing until a lifecycle batch reaches it.
    ///
    /// Registering the same kind+name twice is a warned no-op; the
    /// first registration stays in place.
    pub fn register(
        &mut self,
        kind: EntityKind,
        manifest: Manifest,
        context: Arc<dyn EntityContext>,
        hooks: Arc<dyn EntityHooks>,
    ) {
        let key = (kind, manifest.name.clone());
        if self.entities.contains_key(&key) {
            tracing::warn!(%kind, name = %manifest.name, "entity already registered, ignoring");
            return;
        }
        tracing::debug!(%kind, name = %manifest.name, version = %manifest.version, "entity registered");
        self.entities.insert(
            key,
            Entity {
                manifest,
                status: EntityStatus::Loaded,
                context,
                hooks,
            },
        );
    }

    /// Current status of an entity, if registered.
    pub fn status(&self, kind: EntityKind, name: &str) -> Option<EntityStatus> {
        self.entities
            .get(&(kind, name.to_string()))
            .map(|entity| entity.status.clone())
    }

    /// The capability context an entity was registered with.
    pub fn context(&self, kind: EntityKind, name: &str) -> Option<Arc<dyn EntityContext>> {
        self.entities
            .get(&(kind, name.to_string()))
            .map(|entity| entity.context.clone())
    }

    /// Names of all registered entities of a kind, sorted.
    pub fn names(&self, kind: EntityKind) -> Vec<String> {
        self.entities
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// Initialize every `Loaded` entity of a kind, settling the whole
    /// batch within `budget`.
    pub async fn init_all(&mut self, kind: EntityKind, budget: Duration) -> PhaseReport {
        self.run_phase(kind, HookPhase::Init, budget).await
    }

    /// Start every `Initialized` entity of a kind.
    ///
    /// Entities with unmet declared dependencies are retired before the
    /// batch runs: they move to `NoDependencies`, their destroy path
    /// runs, and they are removed. Retirement is a refusal, not a
    /// failure; retired entities do not appear in the report.
    pub async fn start_all(&mut self, kind: EntityKind, budget: Duration) -> PhaseReport {
        self.retire_unmet(kind).await;
        self.run_phase(kind, HookPhase::Start, budget).await
    }

    /// Stop every `Running` entity of a kind.
    pub async fn stop_all(&mut self, kind: EntityKind, budget: Duration) -> PhaseReport {
        self.run_phase(kind, HookPhase::Stop, budget).await
    }

    /// Start a single entity, checking its dependencies first.
    ///
    /// Already `Starting`/`Running` entities are a warned no-op. An
    /// entity whose dependencies are missing is retired and `Ok` is
    /// still returned; only the entity's own start hook failing is an
    /// error status (carried in the state machine, not returned).
    pub async fn start_entity(&mut self, kind: EntityKind, name: &str) -> Result<()> {
        let key = (kind, name.to_string());
        let Some(entity) = self.entities.get(&key) else {
            return Err(Error::NotFound(format!("{} '{}'", kind, name)));
        };

        match entity.status {
            EntityStatus::Starting | EntityStatus::Running => {
                tracing::warn!(%kind, name, status = %entity.status, "entity already started");
                return Ok(());
            }
            EntityStatus::Initialized => {}
            ref status => {
                tracing::warn!(%kind, name, %status, "entity not ready to start, skipping");
                return Ok(());
            }
        }

        let missing = self.unmet_dependencies(&entity.manifest);
        if !missing.is_empty() {
            let unmet = Error::DependencyUnmet {
                entity: name.to_string(),
                missing,
            };
            tracing::warn!(%kind, error = %unmet, "retiring entity");
            self.retire_unmet_entity(key).await;
            return Ok(());
        }

        self.apply_event(&key, LifecycleEvent::StartRequested);
        let (ctx, hooks) = {
            let entity = &self.entities[&key];
            (entity.context.clone(), entity.hooks.clone())
        };
        match hooks.on_start(ctx.as_ref()).await {
            Ok(()) => self.apply_event(&key, LifecycleEvent::StartSucceeded),
            Err(err) => {
                tracing::error!(%kind, name, error = %err, "start hook failed");
                self.apply_event(&key, LifecycleEvent::StartFailed(err.to_string()));
            }
        }
        Ok(())
    }

    /// Stop a single `Running` entity. Anything else is a warned no-op.
    pub async fn stop_entity(&mut self, kind: EntityKind, name: &str) -> Result<()> {
        let key = (kind, name.to_string());
        let Some(entity) = self.entities.get(&key) else {
            return Err(Error::NotFound(format!("{} '{}'", kind, name)));
        };
        if entity.status != EntityStatus::Running {
            tracing::warn!(%kind, name, status = %entity.status, "entity not running, skipping stop");
            return Ok(());
        }

        self.apply_event(&key, LifecycleEvent::StopRequested);
        let (ctx, hooks) = {
            let entity = &self.entities[&key];
            (entity.context.clone(), entity.hooks.clone())
        };
        match hooks.on_stop(ctx.as_ref()).await {
            Ok(()) => self.apply_event(&key, LifecycleEvent::StopSucceeded),
            Err(err) => {
                tracing::error!(%kind, name, error = %err, "stop hook failed");
                self.apply_event(&key, LifecycleEvent::StopFailed(err.to_string()));
            }
        }
        Ok(())
    }

    /// Destroy a single entity and remove it from the registry.
    ///
    /// Destroy failures are logged, never propagated; the entity is
    /// always removed.
    pub async fn destroy_entity(&mut self, kind: EntityKind, name: &str) -> Result<()> {
        let key = (kind, name.to_string());
        if !self.entities.contains_key(&key) {
            return Err(Error::NotFound(format!("{} '{}'", kind, name)));
        }
        self.apply_event(&key, LifecycleEvent::DestroyRequested);
        self.retire(key).await;
        Ok(())
    }

    /// Destroy every entity of a kind, settling within `budget`.
    ///
    /// All entities of the kind are removed from the registry whether
    /// or not their destroy path finished in time.
    pub async fn destroy_all(&mut self, kind: EntityKind, budget: Duration) -> PhaseReport {
        let keys: Vec<_> = self
            .entities
            .keys()
            .filter(|(k, _)| *k == kind)
            .cloned()
            .collect();

        let mut set = JoinSet::new();
        let mut pending = Vec::new();
        for key in keys {
            self.apply_event(&key, LifecycleEvent::DestroyRequested);
            let entity = match self.entities.remove(&key) {
                Some(entity) => entity,
                None => continue,
            };
            let name = key.1.clone();
            pending.push(name.clone());
            set.spawn(async move {
                let result = run_destroy(&entity).await;
                (name, result)
            });
        }

        self.drain_batch(kind, None, "destroy", set, pending, budget)
            .await
    }

    /// Run one settle-all batch of a hook over all eligible entities.
    async fn run_phase(
        &mut self,
        kind: EntityKind,
        phase: HookPhase,
        budget: Duration,
    ) -> PhaseReport {
        let mut eligible = Vec::new();
        for (key, entity) in self.entities.iter().filter(|((k, _), _)| *k == kind) {
            if entity.status.transition(phase.entry_event()).is_ok() {
                eligible.push(key.clone());
            } else {
                tracing::warn!(
                    %kind,
                    name = %key.1,
                    status = %entity.status,
                    phase = phase.name(),
                    "entity not eligible for phase, skipping"
                );
            }
        }

        let mut set = JoinSet::new();
        let mut pending = Vec::new();
        for key in eligible {
            self.apply_event(&key, phase.entry_event());
            let entity = &self.entities[&key];
            let ctx = entity.context.clone();
            let hooks = entity.hooks.clone();
            let name = key.1.clone();
            pending.push(name.clone());
            set.spawn(async move {
                let result = match phase {
                    HookPhase::Init => match ctx.init().await {
                        Ok(()) => hooks.on_init(ctx.as_ref()).await,
                        Err(err) => Err(err),
                    },
                    HookPhase::Start => hooks.on_start(ctx.as_ref()).await,
                    HookPhase::Stop => hooks.on_stop(ctx.as_ref()).await,
                };
                (name, result)
            });
        }

        self.drain_batch(kind, Some(phase), phase.name(), set, pending, budget)
            .await
    }

    /// Collect a batch's outcomes under a shared deadline.
    ///
    /// Outcomes are applied as they land. On deadline expiry the
    /// remaining tasks are detached, never aborted, and their entities
    /// are reported as timed out.
    async fn drain_batch(
        &mut self,
        kind: EntityKind,
        events: Option<HookPhase>,
        label: &'static str,
        mut set: JoinSet<(String, Result<()>)>,
        mut pending: Vec<String>,
        budget: Duration,
    ) -> PhaseReport {
        let deadline = Instant::now() + budget;
        let mut report = PhaseReport::default();

        loop {
            let joined = match timeout_at(deadline, set.join_next()).await {
                Ok(Some(joined)) => joined,
                Ok(None) => break,
                Err(_) => {
                    set.detach_all();
                    break;
                }
            };
            let (name, result) = match joined {
                Ok(outcome) => outcome,
                Err(join_err) => {
                    tracing::error!(%kind, phase = label, error = %join_err, "hook task aborted");
                    continue;
                }
            };
            pending.retain(|n| n != &name);
            let key = (kind, name.clone());
            match result {
                Ok(()) => {
                    if let Some(phase) = events {
                        self.apply_event(&key, phase.success_event());
                    }
                    report.completed.push(name);
                }
                Err(err) => {
                    tracing::error!(%kind, name = %name, phase = label, error = %err, "hook failed");
                    if let Some(phase) = events {
                        self.apply_event(&key, phase.failure_event(err.to_string()));
                    }
                    report.failed.push((name, err.to_string()));
                }
            }
        }

        if !pending.is_empty() {
            tracing::warn!(
                %kind,
                phase = label,
                entities = ?pending,
                budget_ms = budget.as_millis() as u64,
                "phase budget expired with hooks still running"
            );
            report.timed_out = pending;
        }
        report
    }

    /// Retire every entity of a kind whose declared dependencies are
    /// not available: mark `NoDependencies`, run its destroy path and
    /// remove it.
    async fn retire_unmet(&mut self, kind: EntityKind) {
        let candidates: Vec<_> = self
            .entities
            .iter()
            .filter(|((k, _), entity)| *k == kind && entity.status == EntityStatus::Initialized)
            .map(|(key, entity)| (key.clone(), self.unmet_dependencies(&entity.manifest)))
            .collect();

        for (key, missing) in candidates {
            if missing.is_empty() {
                continue;
            }
            let unmet = Error::DependencyUnmet {
                entity: key.1.clone(),
                missing,
            };
            tracing::warn!(%kind, error = %unmet, "retiring entity");
            self.retire_unmet_entity(key).await;
        }
    }

    /// Retire an `Initialized` entity whose dependencies are missing:
    /// walk it through `noDependencies` into destroy, then remove it.
    async fn retire_unmet_entity(&mut self, key: (EntityKind, String)) {
        self.apply_event(&key, LifecycleEvent::DependenciesUnmet);
        self.apply_event(&key, LifecycleEvent::DestroyRequested);
        self.retire(key).await;
    }

    /// Names of declared dependencies that are not registered or not
    /// yet usable (`Initialized`, `Starting` or `Running`).
    fn unmet_dependencies(&self, manifest: &Manifest) -> Vec<String> {
        let mut missing = Vec::new();
        for name in &manifest.require_driver {
            if !self.is_available(EntityKind::Driver, name) {
                missing.push(format!("driver '{}'", name));
            }
        }
        for name in &manifest.require_service {
            if !self.is_available(EntityKind::Service, name) {
                missing.push(format!("service '{}'", name));
            }
        }
        missing
    }

    fn is_available(&self, kind: EntityKind, name: &str) -> bool {
        matches!(
            self.entities
                .get(&(kind, name.to_string()))
                .map(|entity| &entity.status),
            Some(EntityStatus::Initialized | EntityStatus::Starting | EntityStatus::Running)
        )
    }

    /// Remove an entity and run its destroy path, swallowing errors.
    async fn retire(&mut self, key: (EntityKind, String)) {
        if let Some(entity) = self.entities.remove(&key) {
            if let Err(err) = run_destroy(&entity).await {
                tracing::error!(
                    kind = %key.0,
                    name = %key.1,
                    error = %err,
                    "destroy path failed during retirement"
                );
            }
        }
    }

    /// Apply a lifecycle event to an entity, warning on illegal moves.
    fn apply_event(&mut self, key: &(EntityKind, String), event: LifecycleEvent) {
        let Some(entity) = self.entities.get_mut(key) else {
            return;
        };
        match entity.status.transition(event) {
            Ok(next) => entity.status = next,
            Err(illegal) => {
                tracing::warn!(kind = %key.0, name = %key.1, "{}", illegal);
            }
        }
    }
}

/// The destroy path: the entity's hook first, then its context
/// teardown. The context always tears down, even when the hook failed;
/// the first error wins.
async fn run_destroy(entity: &Entity) -> Result<()> {
    let hook_result = entity.hooks.on_destroy(entity.context.as_ref()).await;
    let ctx_result = entity.context.destroy().await;
    hook_result.and(ctx_result)
}
