//! Unified error types surfaced by the runtime API.

use thiserror::Error;
use tokio::sync::oneshot;

use combat_core::{BattleError, BattleId, CharacterId, CombatError, ErrorCategory};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Battle(#[from] BattleError),

    #[error("unknown battle {0}")]
    UnknownBattle(BattleId),

    #[error("{character} is already fighting in {battle}")]
    AlreadyInBattle {
        character: CharacterId,
        battle: BattleId,
    },

    #[error("battle worker command channel closed")]
    CommandChannelClosed,

    #[error("battle worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("battle registry lock was poisoned")]
    RegistryPoisoned,

    #[error("action log persistence is not enabled")]
    PersistenceDisabled,

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("runtime requires a character store before building")]
    MissingOracles,
}

impl CombatError for RuntimeError {
    fn category(&self) -> ErrorCategory {
        match self {
            RuntimeError::Battle(error) => error.category(),
            RuntimeError::UnknownBattle(_) => ErrorCategory::NotFound,
            RuntimeError::AlreadyInBattle { .. } | RuntimeError::PersistenceDisabled => {
                ErrorCategory::State
            }
            RuntimeError::CommandChannelClosed
            | RuntimeError::ReplyChannelClosed(_)
            | RuntimeError::WorkerJoin(_)
            | RuntimeError::RegistryPoisoned
            | RuntimeError::Repository(_)
            | RuntimeError::MissingOracles => ErrorCategory::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RuntimeError::Battle(error) => error.error_code(),
            RuntimeError::UnknownBattle(_) => "RUNTIME_UNKNOWN_BATTLE",
            RuntimeError::AlreadyInBattle { .. } => "RUNTIME_ALREADY_IN_BATTLE",
            RuntimeError::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            RuntimeError::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            RuntimeError::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            RuntimeError::RegistryPoisoned => "RUNTIME_REGISTRY_POISONED",
            RuntimeError::PersistenceDisabled => "RUNTIME_PERSISTENCE_DISABLED",
            RuntimeError::Repository(_) => "RUNTIME_REPOSITORY",
            RuntimeError::MissingOracles => "RUNTIME_MISSING_ORACLES",
        }
    }
}
