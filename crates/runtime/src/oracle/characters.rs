//! In-memory character store.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use combat_core::{CharacterId, CharacterOracle, CombatAttributes};

use crate::repository::{RepositoryError, Result};

/// Shared, mutable source of character attributes.
///
/// Clones share storage. Battles read from it through [`CharacterOracle`]
/// on every action, and the character sync observer writes HP and resource
/// changes back after each resolution.
#[derive(Debug, Clone, Default)]
pub struct CharacterStore {
    characters: Arc<RwLock<HashMap<CharacterId, CombatAttributes>>>,
}

impl CharacterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: CharacterId, attributes: CombatAttributes) -> Result<()> {
        self.write()?.insert(id, attributes);
        Ok(())
    }

    pub fn get(&self, id: CharacterId) -> Result<Option<CombatAttributes>> {
        let characters = self
            .characters
            .read()
            .map_err(|_| RepositoryError::LockPoisoned { store: "character store" })?;
        Ok(characters.get(&id).cloned())
    }

    /// Sets current HP, capped by max HP. Returns false for unknown ids.
    pub fn set_hp(&self, id: CharacterId, hp: u32) -> Result<bool> {
        self.update(id, |attributes| {
            attributes.hp = hp.min(attributes.max_hp);
        })
    }

    /// Deducts CP and SP, saturating at zero. Returns false for unknown ids.
    pub fn consume_resources(&self, id: CharacterId, cp: u32, sp: u32) -> Result<bool> {
        self.update(id, |attributes| {
            attributes.cp = attributes.cp.saturating_sub(cp);
            attributes.sp = attributes.sp.saturating_sub(sp);
        })
    }

    fn update(&self, id: CharacterId, apply: impl FnOnce(&mut CombatAttributes)) -> Result<bool> {
        let mut characters = self.write()?;
        match characters.get_mut(&id) {
            Some(attributes) => {
                apply(attributes);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<CharacterId, CombatAttributes>>> {
        self.characters
            .write()
            .map_err(|_| RepositoryError::LockPoisoned { store: "character store" })
    }
}

impl CharacterOracle for CharacterStore {
    fn attributes(&self, id: CharacterId) -> Option<CombatAttributes> {
        self.characters.read().ok()?.get(&id).cloned()
    }
}

impl FromIterator<(CharacterId, CombatAttributes)> for CharacterStore {
    fn from_iter<I: IntoIterator<Item = (CharacterId, CombatAttributes)>>(iter: I) -> Self {
        Self {
            characters: Arc::new(RwLock::new(iter.into_iter().collect())),
        }
    }
}
