use crate::env::CombatEnv;
use crate::state::{Battle, CharacterId, Participant, Timestamp};

use super::error::ActionError;
use super::result::ActionEffect;

/// Defines how a typed action mutates a battle.
///
/// The engine runs checks shared by every action (battle status, actor
/// activity, AP, CP/SP) before calling `pre_validate`. Implementors only
/// check what is specific to their action. `apply` may assume `pre_validate`
/// succeeded; if `apply` or `post_validate` fails, the engine restores the
/// battle to its pre-action snapshot.
pub trait ActionTransition {
    /// Validates pre-conditions using the battle **before** mutation.
    fn pre_validate(&self, _battle: &Battle, _env: &CombatEnv<'_>) -> Result<(), ActionError> {
        Ok(())
    }

    /// Applies the action by mutating the battle directly.
    fn apply(
        &self,
        battle: &mut Battle,
        env: &CombatEnv<'_>,
        now: Timestamp,
    ) -> Result<ActionEffect, ActionError>;

    /// Validates post-conditions using the battle **after** mutation.
    fn post_validate(&self, _battle: &Battle, _env: &CombatEnv<'_>) -> Result<(), ActionError> {
        Ok(())
    }
}

/// Resolves a target id to a participant that is still in the fight.
pub(crate) fn live_target(battle: &Battle, target: CharacterId) -> Result<&Participant, ActionError> {
    battle
        .participant(target)
        .filter(|p| p.is_active())
        .ok_or(ActionError::InvalidTarget(Some(target)))
}

pub(crate) fn actor_mut(
    battle: &mut Battle,
    actor: CharacterId,
) -> Result<&mut Participant, ActionError> {
    battle
        .participant_mut(actor)
        .ok_or(ActionError::ActorInactive(actor))
}
