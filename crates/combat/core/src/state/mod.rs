//! Battle state: identifiers, grid, participants and the battle aggregate.

mod battle;
mod grid;
mod participant;
mod status;
mod types;

pub use battle::Battle;
pub use grid::{Grid, GridError};
pub use participant::Participant;
pub use status::{BattleStatus, BattleType};
pub use types::{BattleId, CharacterId, GridDimensions, ItemId, Position, Timestamp};
