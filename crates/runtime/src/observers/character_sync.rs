//! Writes battle outcomes back to the character store.

use combat_core::{BattleId, CharacterId, CombatEvent, ItemEffect};

use super::{CombatObserver, ObserverError};
use crate::oracle::CharacterStore;

/// Keeps [`CharacterStore`] in step with battles.
///
/// - HP after damage, healing and healing items is written back.
/// - CP/SP spent on jutsu and heals is deducted.
pub struct CharacterSyncObserver {
    store: CharacterStore,
}

impl CharacterSyncObserver {
    pub const PRIORITY: i32 = -100;

    pub fn new(store: CharacterStore) -> Self {
        Self { store }
    }

    fn set_hp(&self, character: CharacterId, hp: u32) -> Result<(), ObserverError> {
        if self.store.set_hp(character, hp)? {
            Ok(())
        } else {
            Err(ObserverError::UnknownCharacter(character))
        }
    }
}

impl CombatObserver for CharacterSyncObserver {
    fn name(&self) -> &'static str {
        "character_sync"
    }

    fn priority(&self) -> i32 {
        Self::PRIORITY
    }

    fn on_event(&self, _battle: BattleId, event: &CombatEvent) -> Result<(), ObserverError> {
        match *event {
            CombatEvent::DamageDealt {
                target,
                remaining_hp,
                ..
            }
            | CombatEvent::HealingDone {
                target,
                remaining_hp,
                ..
            }
            | CombatEvent::ItemUsed {
                target,
                effect: ItemEffect::RestoreHealth(_),
                remaining_hp,
                ..
            } => self.set_hp(target, remaining_hp),
            CombatEvent::ResourcesConsumed { character, cp, sp } => {
                if self.store.consume_resources(character, cp, sp)? {
                    Ok(())
                } else {
                    Err(ObserverError::UnknownCharacter(character))
                }
            }
            _ => Ok(()),
        }
    }
}
