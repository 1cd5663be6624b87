//! Scripted battle scenarios loaded from TOML.
//!
//! ```toml
//! battle_type = "pvp"
//! grid = { rows = 5, columns = 8 }
//!
//! [[characters]]
//! id = 1
//! name = "Kenji"
//! position = { row = 0, col = 0 }
//! attributes = { taijutsu = 1000, speed = 40 }
//!
//! [[items]]
//! id = 1
//! effect = { restore_health = 30 }
//!
//! [[steps]]
//! step = "action"
//! actor = 1
//! action_type = "attack"
//! ap_cost = 10
//! target = 2
//! style = "taijutsu"
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use combat_core::{
    BattleType, CharacterId, CombatAction, CombatAttributes, GridDimensions, ItemEffect, ItemId,
    Position,
};
use combat_runtime::{CharacterStore, ItemCatalog};

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_battle_type")]
    pub battle_type: BattleType,
    /// Defaults to the runtime's configured grid.
    #[serde(default)]
    pub grid: Option<GridDimensions>,
    pub characters: Vec<CharacterSpec>,
    #[serde(default)]
    pub items: Vec<ItemSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

fn default_battle_type() -> BattleType {
    BattleType::PvP
}

#[derive(Debug, Clone, Deserialize)]
pub struct CharacterSpec {
    pub id: CharacterId,
    #[serde(default)]
    pub name: Option<String>,
    /// Requested starting cell; the first free cell is used otherwise.
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub attributes: CombatAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemSpec {
    pub id: ItemId,
    pub effect: ItemEffect,
}

/// One scripted operation, applied after the battle has started.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    Action(CombatAction),
    EndTurn { character: CharacterId },
    Ready { character: CharacterId },
    Pause,
    Resume,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario: {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid scenario: {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let scenario: Self = toml::from_str(text).context("Failed to parse scenario TOML")?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<()> {
        if self.characters.is_empty() {
            bail!("scenario has no characters");
        }

        let mut seen = HashSet::new();
        for character in &self.characters {
            if !seen.insert(character.id) {
                bail!("character {} is listed twice", character.id);
            }
        }

        Ok(())
    }

    pub fn character_store(&self) -> Result<CharacterStore> {
        let store = CharacterStore::new();
        for character in &self.characters {
            store
                .insert(character.id, character.attributes.clone())
                .context("Failed to seed character store")?;
        }
        Ok(store)
    }

    pub fn item_catalog(&self) -> ItemCatalog {
        self.items
            .iter()
            .fold(ItemCatalog::new(), |catalog, item| {
                catalog.with_item(item.id, item.effect)
            })
    }

    /// Display names keyed by character id.
    pub fn names(&self) -> HashMap<CharacterId, String> {
        self.characters
            .iter()
            .map(|c| {
                let name = c.name.clone().unwrap_or_else(|| c.id.to_string());
                (c.id, name)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{ActionType, CombatStyle, Element};

    const DUEL: &str = include_str!("../scenarios/duel.toml");

    #[test]
    fn bundled_duel_parses() {
        let scenario = Scenario::parse(DUEL).unwrap();

        assert_eq!(scenario.battle_type, BattleType::PvP);
        assert_eq!(scenario.characters.len(), 2);
        assert_eq!(scenario.items.len(), 1);
        assert!(!scenario.steps.is_empty());

        let kenji = &scenario.characters[0];
        assert_eq!(kenji.name.as_deref(), Some("Kenji"));
        assert_eq!(kenji.position, Some(Position::new(0, 0)));
        assert_eq!(kenji.attributes.taijutsu, 1000);
        // unspecified attributes keep their defaults
        assert_eq!(kenji.attributes.genjutsu, CombatAttributes::default().genjutsu);
    }

    #[test]
    fn steps_are_tagged() {
        let scenario = Scenario::parse(
            r#"
            [[characters]]
            id = 1

            [[characters]]
            id = 2
            attributes = { element = "fire" }

            [[steps]]
            step = "action"
            actor = 1
            action_type = "jutsu"
            ap_cost = 20
            cp_cost = 10
            sp_cost = 5
            target = 2
            style = "ninjutsu"
            element = "water"

            [[steps]]
            step = "end_turn"
            character = 1

            [[steps]]
            step = "pause"
            "#,
        )
        .unwrap();

        assert_eq!(scenario.characters[1].attributes.element, Element::Fire);
        match &scenario.steps[0] {
            Step::Action(action) => {
                assert_eq!(action.action_type, ActionType::Jutsu);
                assert_eq!(action.style, Some(CombatStyle::Ninjutsu));
                assert_eq!(action.element, Element::Water);
                assert_eq!(action.target, Some(CharacterId(2)));
            }
            other => panic!("unexpected step {other:?}"),
        }
        assert!(matches!(
            scenario.steps[1],
            Step::EndTurn {
                character: CharacterId(1)
            }
        ));
        assert!(matches!(scenario.steps[2], Step::Pause));
    }

    #[test]
    fn duplicate_characters_are_rejected() {
        let result = Scenario::parse(
            r#"
            [[characters]]
            id = 1

            [[characters]]
            id = 1
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn empty_scenarios_are_rejected() {
        assert!(Scenario::parse("characters = []").is_err());
    }
}
