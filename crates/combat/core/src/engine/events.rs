//! Ordered notifications emitted by engine operations.

use crate::combat::BattleReward;
use crate::env::ItemEffect;
use crate::state::{CharacterId, ItemId, Participant, Position};

/// Why a participant's turn ended.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TurnEndReason {
    /// The participant asked to end its turn.
    Voluntary,
    /// The turn timer expired first.
    TimedOut,
}

/// Something observable that happened inside a battle.
///
/// Events of one operation are returned in the order they happened, and
/// downstream consumers must preserve that order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CombatEvent {
    ParticipantJoined {
        character: CharacterId,
        position: Position,
        hp: u32,
        max_hp: u32,
    },
    BattleStarted {
        /// Participants in initiative order.
        order: Vec<CharacterId>,
    },
    ResourcesConsumed {
        character: CharacterId,
        cp: u32,
        sp: u32,
    },
    Moved {
        character: CharacterId,
        from: Position,
        to: Position,
    },
    DamageDealt {
        attacker: CharacterId,
        target: CharacterId,
        amount: u32,
        remaining_hp: u32,
    },
    HealingDone {
        healer: CharacterId,
        target: CharacterId,
        amount: u32,
        remaining_hp: u32,
    },
    ItemUsed {
        character: CharacterId,
        item: ItemId,
        target: CharacterId,
        effect: ItemEffect,
        remaining_hp: u32,
    },
    ParticipantDefeated {
        character: CharacterId,
        defeated_by: CharacterId,
    },
    ParticipantFled {
        character: CharacterId,
    },
    ParticipantReady {
        character: CharacterId,
    },
    /// Every active participant was ready; all AP has been restored.
    RoundReset,
    TurnEnded {
        character: CharacterId,
        reason: TurnEndReason,
    },
    BattlePaused,
    BattleResumed,
    BattleEnded {
        winner: Option<CharacterId>,
        reward: Option<BattleReward>,
    },
}

impl CombatEvent {
    pub fn joined(participant: &Participant) -> Self {
        CombatEvent::ParticipantJoined {
            character: participant.character_id(),
            position: participant.position(),
            hp: participant.current_hp(),
            max_hp: participant.max_hp(),
        }
    }

    /// Character whose membership in the battle ends with this event.
    pub fn released_character(&self) -> Option<CharacterId> {
        match self {
            CombatEvent::ParticipantDefeated { character, .. }
            | CombatEvent::ParticipantFled { character } => Some(*character),
            _ => None,
        }
    }

    pub fn is_battle_end(&self) -> bool {
        matches!(self, CombatEvent::BattleEnded { .. })
    }
}
