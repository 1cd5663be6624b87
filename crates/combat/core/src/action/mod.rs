//! Combat actions: the caller-facing request, its typed transitions and the
//! records they produce.
//!
//! A [`CombatAction`] is structurally checked by [`CombatAction::classify`],
//! which yields an [`ActionKind`] whose variant implements
//! [`ActionTransition`]. The engine drives that transition through
//! `pre_validate → apply → post_validate`.

mod error;
mod flee;
mod heal;
mod item;
mod movement;
mod request;
mod result;
mod strike;
mod transition;

pub use error::{ActionError, InvalidActionReason, MoveRejection};
pub use flee::FleeAction;
pub use heal::HealAction;
pub use item::ItemAction;
pub use movement::MoveAction;
pub use request::{ActionKind, ActionType, CombatAction};
pub use result::{ActionEffect, CombatActionResult};
pub use strike::{StrikeAction, StrikeKind};
pub use transition::ActionTransition;
