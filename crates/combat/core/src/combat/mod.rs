//! Pure combat formulas shared by every offensive and supportive action.
//!
//! Nothing in this module touches battle state; actions call these functions
//! with attribute snapshots and apply the results themselves.

mod damage;
mod healing;
mod reward;

pub use damage::{apply_damage, attack_stat, calculate_damage, defense_value};
pub use healing::{apply_healing, calculate_healing};
pub use reward::BattleReward;
