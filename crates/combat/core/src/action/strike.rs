use crate::combat::calculate_damage;
use crate::env::CombatEnv;
use crate::state::{Battle, CharacterId, Timestamp};
use crate::stats::{CombatStyle, Element};

use super::error::ActionError;
use super::result::ActionEffect;
use super::transition::{ActionTransition, actor_mut, live_target};

/// Which offensive action produced a strike. All three share one damage rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StrikeKind {
    Attack,
    Jutsu,
    Weapon,
}

/// Damage-dealing action against a single participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrikeAction {
    pub actor: CharacterId,
    pub kind: StrikeKind,
    pub target: CharacterId,
    pub style: Option<CombatStyle>,
    pub element: Element,
    pub ap_cost: u32,
}

impl ActionTransition for StrikeAction {
    fn pre_validate(&self, battle: &Battle, env: &CombatEnv<'_>) -> Result<(), ActionError> {
        live_target(battle, self.target)?;
        for id in [self.actor, self.target] {
            env.attributes(id).ok_or(ActionError::UnknownCharacter(id))?;
        }
        Ok(())
    }

    fn apply(
        &self,
        battle: &mut Battle,
        env: &CombatEnv<'_>,
        now: Timestamp,
    ) -> Result<ActionEffect, ActionError> {
        let attacker = env
            .attributes(self.actor)
            .ok_or(ActionError::UnknownCharacter(self.actor))?;
        let defender = env
            .attributes(self.target)
            .ok_or(ActionError::UnknownCharacter(self.target))?;
        let damage = calculate_damage(&attacker, &defender, self.style, self.element);

        actor_mut(battle, self.actor)?.consume_ap(self.ap_cost, now);

        let target = battle
            .participant_mut(self.target)
            .ok_or(ActionError::InvalidTarget(Some(self.target)))?;
        let defeated = target.take_damage(damage);
        let remaining_hp = target.current_hp();
        let position = target.position();

        if defeated {
            battle.grid_mut().vacate(self.target, position)?;
        }

        Ok(ActionEffect::Damaged {
            target: self.target,
            damage,
            remaining_hp,
            defeated,
        })
    }
}
