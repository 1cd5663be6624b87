//! Persisted record of one resolved action.

use serde::{Deserialize, Serialize};

use combat_core::{ActionType, BattleId, CharacterId, CombatActionResult, Timestamp};

/// Flat, append-only record of a resolved action.
///
/// Records are keyed by `(battle, sequence)`; the sequence is the battle's
/// action nonce at resolution time and increases by one per action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub battle: BattleId,
    pub sequence: u64,
    pub actor: CharacterId,
    pub action_type: ActionType,
    pub target: Option<CharacterId>,
    pub ap_cost: u32,
    pub cp_cost: u32,
    pub sp_cost: u32,
    pub damage_dealt: u32,
    pub healing_done: u32,
    pub success: bool,
    pub resolved_at: Timestamp,
}

impl From<&CombatActionResult> for ActionRecord {
    fn from(result: &CombatActionResult) -> Self {
        Self {
            battle: result.battle_id,
            sequence: result.sequence,
            actor: result.actor,
            action_type: result.action_type,
            target: result.target,
            ap_cost: result.ap_spent,
            cp_cost: result.cp_spent,
            sp_cost: result.sp_spent,
            damage_dealt: result.damage_dealt,
            healing_done: result.healing_done,
            success: result.success,
            resolved_at: result.resolved_at,
        }
    }
}
