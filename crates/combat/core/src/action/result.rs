//! Immutable records produced by a resolved action.

use crate::env::ItemEffect;
use crate::state::{BattleId, CharacterId, ItemId, Position, Timestamp};

use super::request::ActionType;

/// What a resolved action did to the battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ActionEffect {
    Moved {
        from: Position,
        to: Position,
    },
    Damaged {
        target: CharacterId,
        damage: u32,
        remaining_hp: u32,
        defeated: bool,
    },
    Healed {
        target: CharacterId,
        amount: u32,
        remaining_hp: u32,
    },
    ItemUsed {
        item: ItemId,
        target: CharacterId,
        effect: ItemEffect,
        restored: u32,
    },
    Fled {
        from: Position,
    },
}

impl ActionEffect {
    pub fn damage_dealt(&self) -> u32 {
        match self {
            ActionEffect::Damaged { damage, .. } => *damage,
            _ => 0,
        }
    }

    /// HP restored by a heal or a healing item.
    pub fn healing_done(&self) -> u32 {
        match self {
            ActionEffect::Healed { amount, .. } => *amount,
            ActionEffect::ItemUsed {
                effect: ItemEffect::RestoreHealth(_),
                restored,
                ..
            } => *restored,
            _ => 0,
        }
    }

    pub fn target(&self) -> Option<CharacterId> {
        match self {
            ActionEffect::Damaged { target, .. }
            | ActionEffect::Healed { target, .. }
            | ActionEffect::ItemUsed { target, .. } => Some(*target),
            ActionEffect::Moved { .. } | ActionEffect::Fled { .. } => None,
        }
    }

    /// True when the actor fled or its target was defeated, the only ways a
    /// participant leaves the fight.
    pub fn removes_participant(&self) -> bool {
        matches!(
            self,
            ActionEffect::Damaged { defeated: true, .. } | ActionEffect::Fled { .. }
        )
    }
}

/// Outcome record of one resolved action, ready for persistence and broadcast.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatActionResult {
    pub battle_id: BattleId,
    /// Position of this action in the battle's resolution order, from 0.
    pub sequence: u64,
    pub actor: CharacterId,
    pub action_type: ActionType,
    pub target: Option<CharacterId>,
    pub ap_spent: u32,
    pub cp_spent: u32,
    pub sp_spent: u32,
    pub damage_dealt: u32,
    pub healing_done: u32,
    pub effect: ActionEffect,
    pub success: bool,
    pub resolved_at: Timestamp,
}
