//! Payload types carried by [`super::Event`].

use serde::{Deserialize, Serialize};

use combat_core::{BattleId, CombatEvent};

use super::bus::Topic;

/// Engine event tagged with the battle that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleEvent {
    pub battle: BattleId,
    pub event: CombatEvent,
}

impl BattleEvent {
    pub fn new(battle: BattleId, event: CombatEvent) -> Self {
        Self { battle, event }
    }

    pub fn topic(&self) -> Topic {
        match self.event {
            CombatEvent::ParticipantJoined { .. }
            | CombatEvent::BattleStarted { .. }
            | CombatEvent::BattlePaused
            | CombatEvent::BattleResumed
            | CombatEvent::BattleEnded { .. } => Topic::Lifecycle,
            CombatEvent::TurnEnded { .. }
            | CombatEvent::ParticipantReady { .. }
            | CombatEvent::RoundReset => Topic::Turn,
            CombatEvent::ResourcesConsumed { .. }
            | CombatEvent::Moved { .. }
            | CombatEvent::DamageDealt { .. }
            | CombatEvent::HealingDone { .. }
            | CombatEvent::ItemUsed { .. }
            | CombatEvent::ParticipantDefeated { .. }
            | CombatEvent::ParticipantFled { .. } => Topic::Combat,
        }
    }
}
