use crate::combat::calculate_healing;
use crate::env::CombatEnv;
use crate::state::{Battle, CharacterId, Timestamp};

use super::error::ActionError;
use super::result::ActionEffect;
use super::transition::{ActionTransition, actor_mut, live_target};

/// Medical technique restoring HP to a live participant, the healer included.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealAction {
    pub actor: CharacterId,
    pub target: CharacterId,
    pub ap_cost: u32,
}

impl ActionTransition for HealAction {
    fn pre_validate(&self, battle: &Battle, env: &CombatEnv<'_>) -> Result<(), ActionError> {
        live_target(battle, self.target)?;
        env.attributes(self.actor)
            .ok_or(ActionError::UnknownCharacter(self.actor))?;
        Ok(())
    }

    fn apply(
        &self,
        battle: &mut Battle,
        env: &CombatEnv<'_>,
        now: Timestamp,
    ) -> Result<ActionEffect, ActionError> {
        let healer = env
            .attributes(self.actor)
            .ok_or(ActionError::UnknownCharacter(self.actor))?;
        let healing = calculate_healing(&healer);

        actor_mut(battle, self.actor)?.consume_ap(self.ap_cost, now);

        let target = battle
            .participant_mut(self.target)
            .ok_or(ActionError::InvalidTarget(Some(self.target)))?;
        let amount = target.heal(healing);

        Ok(ActionEffect::Healed {
            target: self.target,
            amount,
            remaining_hp: target.current_hp(),
        })
    }
}
