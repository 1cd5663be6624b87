use crate::error::{CombatError, ErrorCategory};
use crate::state::{CharacterId, GridError, ItemId, Position};

/// Why an action was rejected during validation or resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionError {
    #[error("invalid action: {0}")]
    InvalidAction(InvalidActionReason),

    #[error("insufficient AP: needs {required}, has {available}")]
    InsufficientAp { required: u32, available: u32 },

    #[error(
        "insufficient resources: needs {cp_required} CP / {sp_required} SP, has {cp_available} CP / {sp_available} SP"
    )]
    InsufficientResources {
        cp_required: u32,
        cp_available: u32,
        sp_required: u32,
        sp_available: u32,
    },

    #[error("invalid move: {0}")]
    InvalidMove(MoveRejection),

    #[error("invalid target {0:?}")]
    InvalidTarget(Option<CharacterId>),

    #[error("{0} can no longer act in this battle")]
    ActorInactive(CharacterId),

    #[error("no combat attributes available for {0}")]
    UnknownCharacter(CharacterId),

    #[error("grid rejected the mutation: {0}")]
    Grid(#[from] GridError),
}

/// Structural problems with an action, detected before any state is read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InvalidActionReason {
    #[error("AP cost must be positive")]
    ZeroApCost,

    #[error("move requires a target position")]
    MissingDestination,

    #[error("action requires a target character")]
    MissingTarget,

    #[error("technique requires positive CP and SP costs")]
    MissingResourceCost,

    #[error("item action requires an item id")]
    MissingItem,

    #[error("item {0} is not usable in battle")]
    UnknownItem(ItemId),
}

/// Why a move was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveRejection {
    #[error("destination {0} is outside the grid")]
    OutOfBounds(Position),

    #[error("destination {position} is occupied by {occupant}")]
    Occupied {
        position: Position,
        occupant: CharacterId,
    },

    #[error("declared cost {declared} does not match distance cost {required}")]
    CostMismatch { declared: u32, required: u32 },
}

impl CombatError for ActionError {
    fn category(&self) -> ErrorCategory {
        match self {
            ActionError::UnknownCharacter(_) => ErrorCategory::NotFound,
            ActionError::Grid(_) => ErrorCategory::Internal,
            _ => ErrorCategory::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ActionError::InvalidAction(_) => "ACTION_INVALID",
            ActionError::InsufficientAp { .. } => "ACTION_INSUFFICIENT_AP",
            ActionError::InsufficientResources { .. } => "ACTION_INSUFFICIENT_RESOURCES",
            ActionError::InvalidMove(_) => "ACTION_INVALID_MOVE",
            ActionError::InvalidTarget(_) => "ACTION_INVALID_TARGET",
            ActionError::ActorInactive(_) => "ACTION_ACTOR_INACTIVE",
            ActionError::UnknownCharacter(_) => "ACTION_UNKNOWN_CHARACTER",
            ActionError::Grid(_) => "ACTION_GRID_DESYNC",
        }
    }
}

impl From<InvalidActionReason> for ActionError {
    fn from(reason: InvalidActionReason) -> Self {
        ActionError::InvalidAction(reason)
    }
}

impl From<MoveRejection> for ActionError {
    fn from(rejection: MoveRejection) -> Self {
        ActionError::InvalidMove(rejection)
    }
}
