//! Per-character battle state.

use crate::combat::{apply_damage, apply_healing};
use crate::config::CombatConfig;

use super::types::{CharacterId, Position, Timestamp};

/// A character's presence inside one battle.
///
/// HP here is a battle-local snapshot taken at join time; writing it back to
/// the character record is left to observers. Defeat is a one-way latch and
/// fleeing removes the participant from play without counting as a defeat.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Participant {
    character_id: CharacterId,
    position: Position,
    current_ap: u32,
    current_hp: u32,
    max_hp: u32,
    /// Raw speed while preparing, dense rank (1 = acts first) after start.
    initiative: u32,
    join_order: u32,
    is_defeated: bool,
    has_fled: bool,
    is_ready: bool,
    last_action_at: Option<Timestamp>,
}

impl Participant {
    pub fn new(
        character_id: CharacterId,
        position: Position,
        current_hp: u32,
        max_hp: u32,
        initiative: u32,
        join_order: u32,
    ) -> Self {
        Self {
            character_id,
            position,
            current_ap: CombatConfig::MAX_AP,
            current_hp: current_hp.min(max_hp),
            max_hp,
            initiative,
            join_order,
            is_defeated: false,
            has_fled: false,
            is_ready: false,
            last_action_at: None,
        }
    }

    pub fn character_id(&self) -> CharacterId {
        self.character_id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn current_ap(&self) -> u32 {
        self.current_ap
    }

    pub fn current_hp(&self) -> u32 {
        self.current_hp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn initiative(&self) -> u32 {
        self.initiative
    }

    pub fn join_order(&self) -> u32 {
        self.join_order
    }

    pub fn is_defeated(&self) -> bool {
        self.is_defeated
    }

    pub fn has_fled(&self) -> bool {
        self.has_fled
    }

    pub fn is_ready(&self) -> bool {
        self.is_ready
    }

    pub fn last_action_at(&self) -> Option<Timestamp> {
        self.last_action_at
    }

    /// Still in the fight: neither defeated nor fled.
    pub fn is_active(&self) -> bool {
        !self.is_defeated && !self.has_fled
    }

    pub fn can_act(&self, ap_cost: u32) -> bool {
        self.is_active() && self.current_ap >= ap_cost
    }

    pub fn consume_ap(&mut self, ap_cost: u32, now: Timestamp) {
        self.current_ap = self.current_ap.saturating_sub(ap_cost);
        self.last_action_at = Some(now);
    }

    /// Applies a verified move. The grid must already have been updated.
    pub fn move_to(&mut self, destination: Position, ap_cost: u32, now: Timestamp) {
        self.position = destination;
        self.consume_ap(ap_cost, now);
    }

    /// Returns true when this hit is the one that defeated the participant.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        self.current_hp = apply_damage(self.current_hp, amount);
        if self.current_hp == 0 && !self.is_defeated {
            self.is_defeated = true;
            return true;
        }
        false
    }

    /// Returns the HP actually restored. Defeat is never cleared.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.current_hp;
        self.current_hp = apply_healing(self.current_hp, self.max_hp, amount);
        self.current_hp - before
    }

    /// Returns the AP actually restored.
    pub fn restore_ap(&mut self, amount: u32) -> u32 {
        let before = self.current_ap;
        self.current_ap = self
            .current_ap
            .saturating_add(amount)
            .min(CombatConfig::MAX_AP);
        self.current_ap - before
    }

    /// Starts a fresh turn: full AP and readiness cleared.
    pub fn reset_turn(&mut self, now: Timestamp) {
        self.current_ap = CombatConfig::MAX_AP;
        self.is_ready = false;
        self.last_action_at = Some(now);
    }

    pub(crate) fn flee(&mut self, now: Timestamp) {
        self.has_fled = true;
        self.is_ready = false;
        self.last_action_at = Some(now);
    }

    pub(crate) fn set_ready(&mut self, ready: bool) {
        self.is_ready = ready;
    }

    pub(crate) fn set_initiative(&mut self, initiative: u32) {
        self.initiative = initiative;
    }
}
