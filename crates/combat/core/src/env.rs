//! Read-only collaborators consulted while resolving actions.
//!
//! The engine never caches what these return: attributes are fetched again
//! for every action so that equipment or resource changes made outside the
//! battle are picked up on the next resolution.

use std::collections::{BTreeMap, HashMap};

use crate::state::{CharacterId, ItemId};
use crate::stats::CombatAttributes;

/// Source of character combat attributes, keyed by character id.
pub trait CharacterOracle: Send + Sync {
    fn attributes(&self, id: CharacterId) -> Option<CombatAttributes>;
}

/// Effect of a consumable item used in battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ItemEffect {
    /// Restores HP, capped by the target's max HP.
    RestoreHealth(u32),
    /// Restores AP, capped at the per-turn maximum.
    RestoreActionPoints(u32),
}

/// Source of item definitions.
pub trait ItemOracle: Send + Sync {
    fn item_effect(&self, item: ItemId) -> Option<ItemEffect>;
}

impl CharacterOracle for BTreeMap<CharacterId, CombatAttributes> {
    fn attributes(&self, id: CharacterId) -> Option<CombatAttributes> {
        self.get(&id).cloned()
    }
}

impl CharacterOracle for HashMap<CharacterId, CombatAttributes> {
    fn attributes(&self, id: CharacterId) -> Option<CombatAttributes> {
        self.get(&id).cloned()
    }
}

impl ItemOracle for BTreeMap<ItemId, ItemEffect> {
    fn item_effect(&self, item: ItemId) -> Option<ItemEffect> {
        self.get(&item).copied()
    }
}

impl ItemOracle for HashMap<ItemId, ItemEffect> {
    fn item_effect(&self, item: ItemId) -> Option<ItemEffect> {
        self.get(&item).copied()
    }
}

/// Bundle of oracles handed to the engine for one operation.
#[derive(Clone, Copy)]
pub struct CombatEnv<'a> {
    characters: &'a dyn CharacterOracle,
    items: Option<&'a dyn ItemOracle>,
}

impl<'a> CombatEnv<'a> {
    pub fn new(characters: &'a dyn CharacterOracle) -> Self {
        Self {
            characters,
            items: None,
        }
    }

    pub fn with_items(mut self, items: &'a dyn ItemOracle) -> Self {
        self.items = Some(items);
        self
    }

    pub fn characters(&self) -> &'a dyn CharacterOracle {
        self.characters
    }

    pub fn items(&self) -> Option<&'a dyn ItemOracle> {
        self.items
    }

    pub fn attributes(&self, id: CharacterId) -> Option<CombatAttributes> {
        self.characters.attributes(id)
    }

    pub fn item_effect(&self, item: ItemId) -> Option<ItemEffect> {
        self.items.and_then(|items| items.item_effect(item))
    }
}
