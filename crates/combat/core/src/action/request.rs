//! Caller-facing action request and its structural validation.

use crate::state::{CharacterId, ItemId, Position};
use crate::stats::{CombatStyle, Element};

use super::error::{ActionError, InvalidActionReason};
use super::flee::FleeAction;
use super::heal::HealAction;
use super::item::ItemAction;
use super::movement::MoveAction;
use super::strike::{StrikeAction, StrikeKind};

/// Category of a combat action.
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
pub enum ActionType {
    Move,
    Attack,
    Jutsu,
    Weapon,
    Heal,
    Item,
    Flee,
}

impl ActionType {
    /// Jutsu and healing draw on CP/SP in addition to AP.
    pub const fn uses_resources(self) -> bool {
        matches!(self, ActionType::Jutsu | ActionType::Heal)
    }
}

/// A combat action as submitted by a client.
///
/// This is the flat wire shape: every optional field exists for every type.
/// [`CombatAction::classify`] checks that the fields required by the declared
/// type are present and turns the request into a typed transition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatAction {
    pub actor: CharacterId,
    pub action_type: ActionType,
    pub ap_cost: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cp_cost: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sp_cost: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: Option<CharacterId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target_position: Option<Position>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub style: Option<CombatStyle>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub element: Element,
    #[cfg_attr(feature = "serde", serde(default))]
    pub item: Option<ItemId>,
}

impl CombatAction {
    fn blank(actor: CharacterId, action_type: ActionType, ap_cost: u32) -> Self {
        Self {
            actor,
            action_type,
            ap_cost,
            cp_cost: 0,
            sp_cost: 0,
            target: None,
            target_position: None,
            style: None,
            element: Element::None,
            item: None,
        }
    }

    pub fn movement(actor: CharacterId, destination: Position, ap_cost: u32) -> Self {
        Self {
            target_position: Some(destination),
            ..Self::blank(actor, ActionType::Move, ap_cost)
        }
    }

    pub fn attack(actor: CharacterId, target: CharacterId, style: CombatStyle, ap_cost: u32) -> Self {
        Self {
            target: Some(target),
            style: Some(style),
            ..Self::blank(actor, ActionType::Attack, ap_cost)
        }
    }

    pub fn weapon(actor: CharacterId, target: CharacterId, ap_cost: u32) -> Self {
        Self {
            target: Some(target),
            style: Some(CombatStyle::Bukijutsu),
            ..Self::blank(actor, ActionType::Weapon, ap_cost)
        }
    }

    pub fn jutsu(
        actor: CharacterId,
        target: CharacterId,
        style: CombatStyle,
        ap_cost: u32,
        cp_cost: u32,
        sp_cost: u32,
    ) -> Self {
        Self {
            target: Some(target),
            style: Some(style),
            cp_cost,
            sp_cost,
            ..Self::blank(actor, ActionType::Jutsu, ap_cost)
        }
    }

    pub fn heal(
        actor: CharacterId,
        target: CharacterId,
        ap_cost: u32,
        cp_cost: u32,
        sp_cost: u32,
    ) -> Self {
        Self {
            target: Some(target),
            cp_cost,
            sp_cost,
            ..Self::blank(actor, ActionType::Heal, ap_cost)
        }
    }

    pub fn item(actor: CharacterId, item: ItemId, ap_cost: u32) -> Self {
        Self {
            item: Some(item),
            ..Self::blank(actor, ActionType::Item, ap_cost)
        }
    }

    pub fn flee(actor: CharacterId, ap_cost: u32) -> Self {
        Self::blank(actor, ActionType::Flee, ap_cost)
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    pub fn with_target(mut self, target: CharacterId) -> Self {
        self.target = Some(target);
        self
    }

    /// CP and SP actually charged by this action.
    pub fn resource_cost(&self) -> (u32, u32) {
        if self.action_type.uses_resources() {
            (self.cp_cost, self.sp_cost)
        } else {
            (0, 0)
        }
    }

    /// Checks that the fields required by the action type are present.
    ///
    /// | type             | requires                              |
    /// |------------------|---------------------------------------|
    /// | every type       | `ap_cost > 0`                         |
    /// | Move             | `target_position`                     |
    /// | Attack, Weapon   | `target`                              |
    /// | Jutsu, Heal      | `target`, `cp_cost > 0`, `sp_cost > 0`|
    /// | Item             | `item`                                |
    pub fn classify(&self) -> Result<ActionKind, ActionError> {
        if self.ap_cost == 0 {
            return Err(InvalidActionReason::ZeroApCost.into());
        }

        let target = || self.target.ok_or(InvalidActionReason::MissingTarget);
        let resources = || {
            if self.cp_cost > 0 && self.sp_cost > 0 {
                Ok(())
            } else {
                Err(InvalidActionReason::MissingResourceCost)
            }
        };

        let kind = match self.action_type {
            ActionType::Move => {
                let destination = self
                    .target_position
                    .ok_or(InvalidActionReason::MissingDestination)?;
                ActionKind::Move(MoveAction::new(self.actor, destination, self.ap_cost))
            }
            ActionType::Attack | ActionType::Weapon | ActionType::Jutsu => {
                let target = target()?;
                let kind = match self.action_type {
                    ActionType::Attack => StrikeKind::Attack,
                    ActionType::Weapon => StrikeKind::Weapon,
                    _ => {
                        resources()?;
                        StrikeKind::Jutsu
                    }
                };
                ActionKind::Strike(StrikeAction {
                    actor: self.actor,
                    kind,
                    target,
                    style: self.style,
                    element: self.element,
                    ap_cost: self.ap_cost,
                })
            }
            ActionType::Heal => {
                let target = target()?;
                resources()?;
                ActionKind::Heal(HealAction {
                    actor: self.actor,
                    target,
                    ap_cost: self.ap_cost,
                })
            }
            ActionType::Item => {
                let item = self.item.ok_or(InvalidActionReason::MissingItem)?;
                ActionKind::Item(ItemAction {
                    actor: self.actor,
                    item,
                    target: self.target.unwrap_or(self.actor),
                    ap_cost: self.ap_cost,
                })
            }
            ActionType::Flee => ActionKind::Flee(FleeAction {
                actor: self.actor,
                ap_cost: self.ap_cost,
            }),
        };

        Ok(kind)
    }
}

/// Typed transition produced from a [`CombatAction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    Move(MoveAction),
    Strike(StrikeAction),
    Heal(HealAction),
    Item(ItemAction),
    Flee(FleeAction),
}
