//! Oracle implementations backing the combat environment.
//!
//! The core engine reads characters and items through the traits in
//! `combat_core::env`; this module provides the runtime's in-memory sources
//! and bundles them into a [`CombatEnv`] per operation.

mod characters;
mod items;

pub use characters::CharacterStore;
pub use items::ItemCatalog;

use std::sync::Arc;

use combat_core::CombatEnv;

/// Shared oracles handed to every battle worker.
#[derive(Clone)]
pub struct CombatOracles {
    characters: CharacterStore,
    items: Arc<ItemCatalog>,
}

impl CombatOracles {
    pub fn new(characters: CharacterStore, items: ItemCatalog) -> Self {
        Self {
            characters,
            items: Arc::new(items),
        }
    }

    pub fn characters(&self) -> &CharacterStore {
        &self.characters
    }

    pub fn items(&self) -> &ItemCatalog {
        &self.items
    }

    pub fn as_env(&self) -> CombatEnv<'_> {
        CombatEnv::new(&self.characters).with_items(self.items.as_ref())
    }
}
