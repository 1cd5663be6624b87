use crate::env::CombatEnv;
use crate::state::{Battle, CharacterId, GridError, Position, Timestamp};

use super::error::{ActionError, MoveRejection};
use super::result::ActionEffect;
use super::transition::{ActionTransition, actor_mut};

/// Relocation to a specific cell, paid for with its Manhattan distance in AP.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveAction {
    pub actor: CharacterId,
    pub destination: Position,
    /// Declared cost; must equal the distance exactly.
    pub ap_cost: u32,
}

impl MoveAction {
    pub fn new(actor: CharacterId, destination: Position, ap_cost: u32) -> Self {
        Self {
            actor,
            destination,
            ap_cost,
        }
    }
}

impl ActionTransition for MoveAction {
    fn pre_validate(&self, battle: &Battle, _env: &CombatEnv<'_>) -> Result<(), ActionError> {
        let origin = battle
            .participant(self.actor)
            .ok_or(ActionError::ActorInactive(self.actor))?
            .position();
        let grid = battle.grid();

        if !grid.is_valid_position(self.destination) {
            return Err(MoveRejection::OutOfBounds(self.destination).into());
        }

        if let Some(occupant) = grid.occupant(self.destination) {
            return Err(MoveRejection::Occupied {
                position: self.destination,
                occupant,
            }
            .into());
        }

        let required = grid.movement_cost(origin, self.destination);
        if self.ap_cost != required {
            return Err(MoveRejection::CostMismatch {
                declared: self.ap_cost,
                required,
            }
            .into());
        }

        Ok(())
    }

    fn apply(
        &self,
        battle: &mut Battle,
        _env: &CombatEnv<'_>,
        now: Timestamp,
    ) -> Result<ActionEffect, ActionError> {
        let origin = actor_mut(battle, self.actor)?.position();

        battle
            .grid_mut()
            .relocate(self.actor, origin, self.destination)?;
        actor_mut(battle, self.actor)?.move_to(self.destination, self.ap_cost, now);

        Ok(ActionEffect::Moved {
            from: origin,
            to: self.destination,
        })
    }

    fn post_validate(&self, battle: &Battle, _env: &CombatEnv<'_>) -> Result<(), ActionError> {
        let position = battle
            .participant(self.actor)
            .ok_or(ActionError::ActorInactive(self.actor))?
            .position();

        if battle.grid().occupant(position) == Some(self.actor) {
            Ok(())
        } else {
            Err(GridError::OccupancyDesync {
                actor: self.actor,
                position,
            }
            .into())
        }
    }
}
