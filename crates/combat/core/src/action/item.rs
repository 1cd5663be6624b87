use crate::env::{CombatEnv, ItemEffect};
use crate::state::{Battle, CharacterId, ItemId, Timestamp};

use super::error::{ActionError, InvalidActionReason};
use super::result::ActionEffect;
use super::transition::{ActionTransition, actor_mut, live_target};

/// Use of a consumable; the effect comes from the item oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemAction {
    pub actor: CharacterId,
    pub item: ItemId,
    /// Defaults to the actor when the request names no target.
    pub target: CharacterId,
    pub ap_cost: u32,
}

impl ItemAction {
    fn effect(&self, env: &CombatEnv<'_>) -> Result<ItemEffect, ActionError> {
        env.item_effect(self.item)
            .ok_or(InvalidActionReason::UnknownItem(self.item).into())
    }
}

impl ActionTransition for ItemAction {
    fn pre_validate(&self, battle: &Battle, env: &CombatEnv<'_>) -> Result<(), ActionError> {
        self.effect(env)?;
        live_target(battle, self.target)?;
        Ok(())
    }

    fn apply(
        &self,
        battle: &mut Battle,
        env: &CombatEnv<'_>,
        now: Timestamp,
    ) -> Result<ActionEffect, ActionError> {
        let effect = self.effect(env)?;

        actor_mut(battle, self.actor)?.consume_ap(self.ap_cost, now);

        let target = battle
            .participant_mut(self.target)
            .ok_or(ActionError::InvalidTarget(Some(self.target)))?;
        let restored = match effect {
            ItemEffect::RestoreHealth(amount) => target.heal(amount),
            ItemEffect::RestoreActionPoints(amount) => target.restore_ap(amount),
        };

        Ok(ActionEffect::ItemUsed {
            item: self.item,
            target: self.target,
            effect,
            restored,
        })
    }
}
