use std::collections::HashMap;

use combat_core::{ItemEffect, ItemId, ItemOracle};

/// Static table of items usable in battle.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: HashMap<ItemId, ItemEffect>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, item: ItemId, effect: ItemEffect) -> Self {
        self.insert(item, effect);
        self
    }

    pub fn insert(&mut self, item: ItemId, effect: ItemEffect) {
        self.items.insert(item, effect);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ItemOracle for ItemCatalog {
    fn item_effect(&self, item: ItemId) -> Option<ItemEffect> {
        self.items.get(&item).copied()
    }
}
