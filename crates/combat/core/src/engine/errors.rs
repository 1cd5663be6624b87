//! Error types for the battle engine.

use crate::action::ActionError;
use crate::error::{CombatError, ErrorCategory};
use crate::state::{BattleStatus, CharacterId, GridError};

/// Identifies which stage of the transition pipeline produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TransitionPhase {
    PreValidate,
    Apply,
    PostValidate,
}

/// Associates a transition phase with the underlying error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("{phase} failed: {error}")]
pub struct TransitionPhaseError {
    pub phase: TransitionPhase,
    pub error: ActionError,
}

impl TransitionPhaseError {
    pub fn new(phase: TransitionPhase, error: ActionError) -> Self {
        Self { phase, error }
    }
}

/// Errors surfaced by [`super::BattleEngine`] operations.
///
/// Whatever the variant, the battle is unchanged when one of these is
/// returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("battle has already ended")]
    BattleAlreadyEnded,

    #[error("battle is {status}; participants can only join while preparing")]
    BattleNotPreparing { status: BattleStatus },

    #[error("operation not allowed while battle is {status}")]
    InvalidState { status: BattleStatus },

    #[error("battle needs at least one participant to start")]
    InsufficientParticipants,

    #[error("{0} is already in battle")]
    AlreadyInBattle(CharacterId),

    #[error("{0} is not a participant of this battle")]
    UnknownParticipant(CharacterId),

    #[error("no combat attributes available for {0}")]
    UnknownCharacter(CharacterId),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("action rolled back: {0}")]
    Transition(TransitionPhaseError),
}

impl CombatError for BattleError {
    fn category(&self) -> ErrorCategory {
        match self {
            BattleError::Action(error) => error.category(),
            BattleError::BattleAlreadyEnded
            | BattleError::BattleNotPreparing { .. }
            | BattleError::InvalidState { .. }
            | BattleError::InsufficientParticipants
            | BattleError::AlreadyInBattle(_) => ErrorCategory::State,
            BattleError::UnknownParticipant(_) | BattleError::UnknownCharacter(_) => {
                ErrorCategory::NotFound
            }
            BattleError::Grid(GridError::GridFull) => ErrorCategory::State,
            BattleError::Grid(GridError::InvalidDimensions { .. }) => ErrorCategory::Validation,
            BattleError::Grid(_) | BattleError::Transition(_) => ErrorCategory::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            BattleError::Action(error) => error.error_code(),
            BattleError::BattleAlreadyEnded => "BATTLE_ALREADY_ENDED",
            BattleError::BattleNotPreparing { .. } => "BATTLE_NOT_PREPARING",
            BattleError::InvalidState { .. } => "BATTLE_INVALID_STATE",
            BattleError::InsufficientParticipants => "BATTLE_INSUFFICIENT_PARTICIPANTS",
            BattleError::AlreadyInBattle(_) => "BATTLE_ALREADY_IN_BATTLE",
            BattleError::UnknownParticipant(_) => "BATTLE_UNKNOWN_PARTICIPANT",
            BattleError::UnknownCharacter(_) => "BATTLE_UNKNOWN_CHARACTER",
            BattleError::Grid(GridError::GridFull) => "GRID_FULL",
            BattleError::Grid(GridError::InvalidDimensions { .. }) => "GRID_INVALID_DIMENSIONS",
            BattleError::Grid(_) => "GRID_DESYNC",
            BattleError::Transition(_) => "BATTLE_TRANSITION_FAILED",
        }
    }
}
