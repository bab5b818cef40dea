//! Entity lifecycle kernel for Hearth.
//!
//! The kernel is the top-level orchestrator of a Hearth host: drivers,
//! services and apps register as *entities*, and the kernel sequences
//! their init/start/stop/destroy transitions under dependency
//! constraints. Boot runs a fixed phase order (IO → Drivers →
//! Directories → Configs → Permissions → Services → Apps), each phase
//! settling fully - with a timeout budget - before the next begins.
//!
//! Entity failures are contained: a hook that errors moves its entity
//! into a terminal error status and the rest of the host keeps going;
//! an entity whose declared dependencies are missing is retired
//! gracefully instead of crashing the process.

mod entity;
mod manager;
mod phases;
mod status;

pub use entity::{EntityContext, EntityHooks, EntityKind, Manifest, NoHooks, NullContext};
pub use manager::{EntityManager, PhaseReport};
pub use phases::{BootHook, BootReport, Kernel, KernelConfig, Phase};
pub use status::{EntityStatus, IllegalTransition, LifecycleEvent};
