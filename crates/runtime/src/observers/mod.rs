//! Observers notified after every resolved battle operation.
//!
//! Observers run inside the battle worker, after the engine has committed the
//! new state and before events are broadcast. They see every engine event of
//! the operation in resolution order. An observer failure is logged and never
//! affects the battle: the state change has already happened.
//!
//! Observers are sorted by priority (lower values run first).

mod character_sync;
mod registry;

pub use character_sync::CharacterSyncObserver;
pub use registry::ObserverRegistry;

use combat_core::{BattleId, CharacterId, CombatEvent};

use crate::repository::RepositoryError;

/// How loudly an observer failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverCriticality {
    /// Failure is logged at warn level (default).
    Important,
    /// Failure is logged at debug level.
    Optional,
}

/// Errors returned by observers.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    #[error("character {0} is not known to the observer")]
    UnknownCharacter(CharacterId),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Reacts to engine events of one battle.
pub trait CombatObserver: Send + Sync {
    /// Human-readable name used in logs.
    fn name(&self) -> &'static str;

    fn priority(&self) -> i32 {
        0
    }

    fn criticality(&self) -> ObserverCriticality {
        ObserverCriticality::Important
    }

    fn on_event(&self, battle: BattleId, event: &CombatEvent) -> Result<(), ObserverError>;
}
