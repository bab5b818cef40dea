//! Phased boot and shutdown.
//!
//! Boot walks a fixed phase order, settling each phase fully before the
//! next begins:
//!
//! IO → Drivers → Directories → Configs → Permissions → Services → Apps
//!
//! Every phase carries the same timeout budget, and failures inside a
//! phase are contained to what failed: a driver that will not
//! initialize or a base directory that cannot be created is recorded in
//! the boot report while the rest of the host comes up. Shutdown walks
//! the lifecycle tiers in reverse: apps, then services, then drivers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};

use hearth_core::{ConfigStore, FileAdapter, Result};
use hearth_mounts::MountTable;
use hearth_perms::PermissionTable;

use crate::entity::EntityKind;
use crate::manager::{EntityManager, PhaseReport};

/// One step of the boot sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Io,
    Drivers,
    Directories,
    Configs,
    Permissions,
    Services,
    Apps,
}

impl Phase {
    /// The boot order. Shutdown does not reuse this; it tears down the
    /// entity tiers in reverse.
    pub const ORDER: [Phase; 7] = [
        Phase::Io,
        Phase::Drivers,
        Phase::Directories,
        Phase::Configs,
        Phase::Permissions,
        Phase::Services,
        Phase::Apps,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Io => "io",
            Phase::Drivers => "drivers",
            Phase::Directories => "directories",
            Phase::Configs => "configs",
            Phase::Permissions => "permissions",
            Phase::Services => "services",
            Phase::Apps => "apps",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Host-level boot settings.
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Timeout applied to each phase's settle-all batch.
    pub phase_budget: Duration,
    /// Directories ensured during the Directories phase.
    pub base_directories: Vec<String>,
    /// Config documents pre-loaded during the Configs phase so later
    /// readers hit a warm store.
    pub warm_documents: Vec<String>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            phase_budget: Duration::from_secs(30),
            base_directories: Vec::new(),
            warm_documents: Vec::new(),
        }
    }
}

/// Work run during the IO phase, before any entity exists. Adapter
/// wiring (file adapter mounts, transport bring-up) goes here.
#[async_trait]
pub trait BootHook: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self) -> Result<()>;
}

/// Per-phase outcome of a boot or shutdown pass.
#[derive(Debug, Clone, Default)]
pub struct BootReport {
    pub phases: Vec<(Phase, PhaseReport)>,
}

impl BootReport {
    /// True when no phase recorded a failure or timeout.
    pub fn fully_settled(&self) -> bool {
        self.phases.iter().all(|(_, report)| report.fully_settled())
    }

    /// The report for one phase, if that phase ran.
    pub fn phase(&self, phase: Phase) -> Option<&PhaseReport> {
        self.phases
            .iter()
            .find(|(p, _)| *p == phase)
            .map(|(_, report)| report)
    }
}

/// The host kernel: owns the entity manager, the config-backed tables
/// and the boot sequence.
pub struct Kernel {
    config: KernelConfig,
    manager: EntityManager,
    config_store: Arc<dyn ConfigStore>,
    fs: Arc<dyn FileAdapter>,
    mounts: Option<MountTable>,
    permissions: Option<PermissionTable>,
    io_hooks: Vec<Arc<dyn BootHook>>,
}

impl Kernel {
    pub fn new(
        config: KernelConfig,
        config_store: Arc<dyn ConfigStore>,
        fs: Arc<dyn FileAdapter>,
    ) -> Self {
        Self {
            config,
            manager: EntityManager::new(),
            config_store,
            fs,
            mounts: None,
            permissions: None,
            io_hooks: Vec::new(),
        }
    }

    /// Queue a hook for the IO phase. Hooks run concurrently and settle
    /// together.
    pub fn add_io_hook(&mut self, hook: Arc<dyn BootHook>) {
        self.io_hooks.push(hook);
    }

    pub fn manager(&self) -> &EntityManager {
        &self.manager
    }

    /// Register entities and drive single-entity transitions here.
    pub fn manager_mut(&mut self) -> &mut EntityManager {
        &mut self.manager
    }

    /// The mount table, once the Configs phase has loaded it.
    pub fn mounts(&self) -> Option<&MountTable> {
        self.mounts.as_ref()
    }

    pub fn mounts_mut(&mut self) -> Option<&mut MountTable> {
        self.mounts.as_mut()
    }

    /// The permission table, once the Permissions phase has loaded it.
    pub fn permissions(&self) -> Option<&PermissionTable> {
        self.permissions.as_ref()
    }

    pub fn permissions_mut(&mut self) -> Option<&mut PermissionTable> {
        self.permissions.as_mut()
    }

    /// Run the boot sequence.
    ///
    /// Always runs every phase to completion; per-item failures land in
    /// the report, never abort the sequence.
    pub async fn boot(&mut self) -> BootReport {
        let budget = self.config.phase_budget;
        let mut report = BootReport::default();

        for phase in Phase::ORDER {
            tracing::info!(phase = phase.name(), "boot phase starting");
            let outcome = match phase {
                Phase::Io => self.run_io_hooks(budget).await,
                Phase::Drivers => self.manager.init_all(EntityKind::Driver, budget).await,
                Phase::Directories => self.ensure_directories().await,
                Phase::Configs => self.load_configs().await,
                Phase::Permissions => self.load_permissions().await,
                Phase::Services => self.bring_up(EntityKind::Service, budget).await,
                Phase::Apps => self.bring_up(EntityKind::App, budget).await,
            };
            if !outcome.fully_settled() {
                tracing::warn!(
                    phase = phase.name(),
                    failed = outcome.failed.len(),
                    timed_out = outcome.timed_out.len(),
                    "boot phase settled with failures"
                );
            }
            report.phases.push((phase, outcome));
        }
        tracing::info!(settled = report.fully_settled(), "boot finished");
        report
    }

    /// Tear the host down: apps first, then services, then drivers.
    pub async fn shutdown(&mut self) -> BootReport {
        let budget = self.config.phase_budget;
        let mut report = BootReport::default();

        for (phase, kind) in [
            (Phase::Apps, EntityKind::App),
            (Phase::Services, EntityKind::Service),
        ] {
            let mut outcome = self.manager.stop_all(kind, budget).await;
            merge(&mut outcome, self.manager.destroy_all(kind, budget).await);
            report.phases.push((phase, outcome));
        }
        let drivers = self.manager.destroy_all(EntityKind::Driver, budget).await;
        report.phases.push((Phase::Drivers, drivers));

        tracing::info!(settled = report.fully_settled(), "shutdown finished");
        report
    }

    /// Init then start one entity tier, reported as a single phase.
    async fn bring_up(&mut self, kind: EntityKind, budget: Duration) -> PhaseReport {
        let mut outcome = self.manager.init_all(kind, budget).await;
        merge(&mut outcome, self.manager.start_all(kind, budget).await);
        outcome
    }

    /// Settle all IO hooks under the phase budget.
    async fn run_io_hooks(&mut self, budget: Duration) -> PhaseReport {
        let deadline = Instant::now() + budget;
        let mut set = JoinSet::new();
        let mut pending: Vec<String> = Vec::new();
        for hook in &self.io_hooks {
            let hook = hook.clone();
            let name = hook.name().to_string();
            pending.push(name.clone());
            set.spawn(async move {
                let result = hook.run().await;
                (name, result)
            });
        }

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
                    tracing::error!(error = %join_err, "io hook task aborted");
                    continue;
                }
            };
            pending.retain(|n| n != &name);
            match result {
                Ok(()) => report.completed.push(name),
                Err(err) => {
                    tracing::error!(hook = %name, error = %err, "io hook failed");
                    report.failed.push((name, err.to_string()));
                }
            }
        }
        report.timed_out = pending;
        report
    }

    /// Ensure every configured base directory exists.
    async fn ensure_directories(&mut self) -> PhaseReport {
        let mut report = PhaseReport::default();
        for dir in &self.config.base_directories {
            match self.fs.mkdir(dir).await {
                Ok(()) => report.completed.push(dir.clone()),
                Err(err) => {
                    tracing::error!(dir = %dir, error = %err, "base directory not created");
                    report.failed.push((dir.clone(), err.to_string()));
                }
            }
        }
        report
    }

    /// Load the mount table and warm the configured documents.
    async fn load_configs(&mut self) -> PhaseReport {
        let mut report = PhaseReport::default();

        match MountTable::load(self.config_store.clone()).await {
            Ok(table) => {
                if table.has_cycle() {
                    tracing::warn!("persisted mount table contains a cycle");
                }
                self.mounts = Some(table);
                report.completed.push("mounts".to_string());
            }
            Err(err) => {
                tracing::error!(error = %err, "mount table failed to load");
                report.failed.push(("mounts".to_string(), err.to_string()));
            }
        }

        for doc in &self.config.warm_documents {
            match self.config_store.load(doc).await {
                Ok(_) => report.completed.push(doc.clone()),
                Err(err) => {
                    tracing::warn!(document = %doc, error = %err, "warm load failed");
                    report.failed.push((doc.clone(), err.to_string()));
                }
            }
        }
        report
    }

    /// Load the permission table.
    async fn load_permissions(&mut self) -> PhaseReport {
        let mut report = PhaseReport::default();
        match PermissionTable::load(self.config_store.clone()).await {
            Ok(table) => {
                self.permissions = Some(table);
                report.completed.push("permissions".to_string());
            }
            Err(err) => {
                tracing::error!(error = %err, "permission table failed to load");
                report
                    .failed
                    .push(("permissions".to_string(), err.to_string()));
            }
        }
        report
    }
}

fn merge(into: &mut PhaseReport, other: PhaseReport) {
    into.completed.extend(other.completed);
    into.failed.extend(other.failed);
    into.timed_out.extend(other.timed_out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::{Error, MemoryConfigStore};

    struct OkHook(&'static str);

    #[async_trait]
    impl BootHook for OkHook {
        fn name(&self) -> &str {
            self.0
        }
        async fn run(&self) -> Result<()> {
            Ok(())
        }
    }

    struct FailHook;

    #[async_trait]
    impl BootHook for FailHook {
        fn name(&self) -> &str {
            "fail"
        }
        async fn run(&self) -> Result<()> {
            Err(Error::Transport("device missing".to_string()))
        }
    }

    // Minimal in-memory adapter; only mkdir is exercised here.
    struct NoopFs;

    #[async_trait]
    impl FileAdapter for NoopFs {
        async fn read_text_file(&self, _path: &str) -> Result<String> {
            Err(Error::NotFound("read".to_string()))
        }
        async fn read_bin_file(&self, _path: &str) -> Result<Vec<u8>> {
            Err(Error::NotFound("read".to_string()))
        }
        async fn stat(&self, _path: &str) -> Result<hearth_core::FileStat> {
            Err(Error::NotFound("stat".to_string()))
        }
        async fn read_dir(&self, _path: &str) -> Result<Vec<String>> {
            Ok(vec![])
        }
        async fn read_link(&self, _path: &str) -> Result<String> {
            Err(Error::NotFound("link".to_string()))
        }
        async fn is_text_file_utf8(&self, _path: &str) -> Result<bool> {
            Ok(false)
        }
        async fn real_path(&self, path: &str) -> Result<String> {
            Ok(path.to_string())
        }
        async fn glob(&self, _pattern: &str) -> Result<Vec<String>> {
            Ok(vec![])
        }
        async fn access(&self, _path: &str, _mode: hearth_core::FileAccess) -> Result<bool> {
            Ok(true)
        }
        async fn append_file(&self, _path: &str, _data: &[u8]) -> Result<()> {
            Ok(())
        }
        async fn write_file(&self, _path: &str, _data: &[u8]) -> Result<()> {
            Ok(())
        }
        async fn rm(&self, _paths: &[String]) -> Result<()> {
            Ok(())
        }
        async fn cp(&self, _pairs: &[(String, String)]) -> Result<()> {
            Ok(())
        }
        async fn rename(&self, _pairs: &[(String, String)]) -> Result<()> {
            Ok(())
        }
        async fn mkdir(&self, path: &str) -> Result<()> {
            if path == "/forbidden" {
                return Err(Error::Config("read-only filesystem".to_string()));
            }
            Ok(())
        }
        async fn link(&self, _target: &str, _link_path: &str) -> Result<()> {
            Ok(())
        }
        async fn utimes(&self, _path: &str, _mtime_ms: u64) -> Result<()> {
            Ok(())
        }
        async fn truncate(&self, _path: &str, _len: u64) -> Result<()> {
            Ok(())
        }
        async fn chown(&self, _path: &str, _uid: u32, _gid: u32) -> Result<()> {
            Ok(())
        }
        async fn chmod(&self, _path: &str, _mode: u32) -> Result<()> {
            Ok(())
        }
    }

    fn kernel(config: KernelConfig) -> Kernel {
        Kernel::new(config, Arc::new(MemoryConfigStore::new()), Arc::new(NoopFs))
    }

    #[tokio::test]
    async fn boot_runs_phases_in_order() {
        let mut kernel = kernel(KernelConfig::default());
        let report = kernel.boot().await;

        let order: Vec<Phase> = report.phases.iter().map(|(phase, _)| *phase).collect();
        assert_eq!(order, Phase::ORDER.to_vec());
        assert!(report.fully_settled());
        assert!(kernel.mounts().is_some());
        assert!(kernel.permissions().is_some());
    }

    #[tokio::test]
    async fn io_hook_failure_does_not_stop_boot() {
        let mut kernel = kernel(KernelConfig::default());
        kernel.add_io_hook(Arc::new(OkHook("disk")));
        kernel.add_io_hook(Arc::new(FailHook));

        let report = kernel.boot().await;
        let io = report.phase(Phase::Io).unwrap();
        assert_eq!(io.completed, vec!["disk".to_string()]);
        assert_eq!(io.failed.len(), 1);

        // Later phases still ran.
        assert!(report.phase(Phase::Configs).is_some());
        assert!(kernel.mounts().is_some());
    }

    #[tokio::test]
    async fn directory_failures_are_recorded() {
        let mut kernel = kernel(KernelConfig {
            base_directories: vec!["/data".to_string(), "/forbidden".to_string()],
            ..KernelConfig::default()
        });

        let report = kernel.boot().await;
        let dirs = report.phase(Phase::Directories).unwrap();
        assert_eq!(dirs.completed, vec!["/data".to_string()]);
        assert_eq!(dirs.failed[0].0, "/forbidden");
        assert!(!report.fully_settled());
    }

    #[tokio::test]
    async fn warm_documents_load_during_configs() {
        let store = Arc::new(MemoryConfigStore::new());
        store
            .save("system.hosts", &serde_json::json!({"self": "host-1"}))
            .await
            .unwrap();

        let mut kernel = Kernel::new(
            KernelConfig {
                warm_documents: vec!["system.hosts".to_string()],
                ..KernelConfig::default()
            },
            store,
            Arc::new(NoopFs),
        );
        let report = kernel.boot().await;
        let configs = report.phase(Phase::Configs).unwrap();
        assert!(configs.completed.contains(&"system.hosts".to_string()));
    }
}
