//! Action transition dispatch and execution logic.

use crate::action::{ActionEffect, ActionKind, ActionTransition};
use crate::env::CombatEnv;
use crate::state::{Battle, Timestamp};

use super::errors::{TransitionPhase, TransitionPhaseError};

/// Executes a transition through the three-phase pipeline.
///
/// Phases:
/// 1. `pre_validate` - Check preconditions before mutation
/// 2. `apply` - Mutate the battle and return the effect
/// 3. `post_validate` - Verify postconditions after mutation
#[inline]
fn drive_transition<T>(
    transition: &T,
    battle: &mut Battle,
    env: &CombatEnv<'_>,
    now: Timestamp,
) -> Result<ActionEffect, TransitionPhaseError>
where
    T: ActionTransition,
{
    transition
        .pre_validate(battle, env)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::PreValidate, error))?;

    let effect = transition
        .apply(battle, env, now)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::Apply, error))?;

    transition
        .post_validate(battle, env)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::PostValidate, error))?;

    Ok(effect)
}

/// Routes a typed action to its transition.
pub(super) fn execute_transition(
    kind: &ActionKind,
    battle: &mut Battle,
    env: &CombatEnv<'_>,
    now: Timestamp,
) -> Result<ActionEffect, TransitionPhaseError> {
    match kind {
        ActionKind::Move(transition) => drive_transition(transition, battle, env, now),
        ActionKind::Strike(transition) => drive_transition(transition, battle, env, now),
        ActionKind::Heal(transition) => drive_transition(transition, battle, env, now),
        ActionKind::Item(transition) => drive_transition(transition, battle, env, now),
        ActionKind::Flee(transition) => drive_transition(transition, battle, env, now),
    }
}
