//! Deterministic battle rules for grid-based ninja combat.
//!
//! `combat-core` owns the battle model (grid, participants, lifecycle), the
//! combat formulas and the action pipeline. It performs no I/O: character
//! attributes and item effects are read through the oracles in [`env`], and
//! every operation takes the current [`Timestamp`] explicitly. All mutation
//! flows through [`engine::BattleEngine`].
pub mod action;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod state;
pub mod stats;
pub use action::{
    ActionEffect, ActionError, ActionKind, ActionTransition, ActionType, CombatAction,
    CombatActionResult, FleeAction, HealAction, InvalidActionReason, ItemAction, MoveAction,
    MoveRejection, StrikeAction, StrikeKind,
};
pub use combat::{BattleReward, calculate_damage, calculate_healing};
pub use config::CombatConfig;
pub use engine::{
    ActionOutcome, BattleEngine, BattleError, CombatEvent, TransitionPhase, TransitionPhaseError,
    TurnEndReason,
};
pub use env::{CharacterOracle, CombatEnv, ItemEffect, ItemOracle};
pub use error::{CombatError, ErrorCategory};
pub use state::{
    Battle, BattleId, BattleStatus, BattleType, CharacterId, Grid, GridDimensions, GridError,
    ItemId, Participant, Position, Timestamp,
};
pub use stats::{Affinity, CombatAttributes, CombatStyle, Element, MedicalRank, Rank};
