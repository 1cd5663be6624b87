use crate::env::CombatEnv;
use crate::state::{Battle, CharacterId, Timestamp};

use super::error::ActionError;
use super::result::ActionEffect;
use super::transition::{ActionTransition, actor_mut};

/// Leaves the battle. The actor stops counting toward victory without being
/// defeated, and its cell is freed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FleeAction {
    pub actor: CharacterId,
    pub ap_cost: u32,
}

impl ActionTransition for FleeAction {
    fn apply(
        &self,
        battle: &mut Battle,
        _env: &CombatEnv<'_>,
        now: Timestamp,
    ) -> Result<ActionEffect, ActionError> {
        let participant = actor_mut(battle, self.actor)?;
        participant.consume_ap(self.ap_cost, now);
        participant.flee(now);
        let from = participant.position();

        battle.grid_mut().vacate(self.actor, from)?;

        Ok(ActionEffect::Fled { from })
    }

    fn post_validate(&self, battle: &Battle, _env: &CombatEnv<'_>) -> Result<(), ActionError> {
        let still_placed = battle
            .grid()
            .occupants()
            .any(|(_, occupant)| occupant == self.actor);

        if still_placed {
            Err(ActionError::ActorInactive(self.actor))
        } else {
            Ok(())
        }
    }
}
