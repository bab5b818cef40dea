//! Entity lifecycle state machine.
//!
//! Statuses move through an explicit transition table; there is exactly
//! one entry point ([`EntityStatus::transition`]) and illegal moves are
//! rejected by construction, not by scattered guard checks. The manager
//! treats a rejected transition as a warn-and-skip, never a crash.

use std::fmt;

/// Where an entity is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityStatus {
    /// Registered, nothing run yet.
    Loaded,
    Initializing,
    Initialized,
    /// Init hook failed; the entity stays registered but inert.
    InitError(String),
    Starting,
    Running,
    StartError(String),
    Stopping,
    Stopped,
    StopError(String),
    /// Teardown in progress; the entity is removed when it completes.
    Destroying,
    /// Declared dependencies were missing at start; terminal.
    NoDependencies,
}

impl EntityStatus {
    /// Short status name, without any captured message.
    pub fn name(&self) -> &'static str {
        match self {
            EntityStatus::Loaded => "loaded",
            EntityStatus::Initializing => "initializing",
            EntityStatus::Initialized => "initialized",
            EntityStatus::InitError(_) => "initError",
            EntityStatus::Starting => "starting",
            EntityStatus::Running => "running",
            EntityStatus::StartError(_) => "startError",
            EntityStatus::Stopping => "stopping",
            EntityStatus::Stopped => "stopped",
            EntityStatus::StopError(_) => "stopError",
            EntityStatus::Destroying => "destroying",
            EntityStatus::NoDependencies => "noDependencies",
        }
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An event driving the lifecycle state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    InitRequested,
    InitSucceeded,
    InitFailed(String),
    StartRequested,
    StartSucceeded,
    StartFailed(String),
    StopRequested,
    StopSucceeded,
    StopFailed(String),
    DestroyRequested,
    DependenciesUnmet,
}

/// A rejected lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IllegalTransition {
    pub from: EntityStatus,
    pub event: LifecycleEvent,
}

impl fmt::Display for IllegalTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "illegal transition: {:?} while {}",
            self.event,
            self.from.name()
        )
    }
}

impl std::error::Error for IllegalTransition {}

impl EntityStatus {
    /// Apply a lifecycle event, yielding the next status.
    ///
    /// The table is exhaustive; anything not listed is illegal. Destroy
    /// is the one event accepted from every reachable state.
    pub fn transition(&self, event: LifecycleEvent) -> Result<EntityStatus, IllegalTransition> {
        use EntityStatus::*;
        use LifecycleEvent::*;

        let next = match (self, &event) {
            (Loaded, InitRequested) => Initializing,
            (Initializing, InitSucceeded) => Initialized,
            (Initializing, InitFailed(message)) => InitError(message.clone()),

            (Initialized, StartRequested) => Starting,
            (Starting, StartSucceeded) => Running,
            (Starting, StartFailed(message)) => StartError(message.clone()),

            (Running, StopRequested) => Stopping,
            (Stopping, StopSucceeded) => Stopped,
            (Stopping, StopFailed(message)) => StopError(message.clone()),

            (Initialized, DependenciesUnmet) => NoDependencies,

            (_, DestroyRequested) => Destroying,

            _ => {
                return Err(IllegalTransition {
                    from: self.clone(),
                    event,
                })
            }
        };
        Ok(next)
    }
}
