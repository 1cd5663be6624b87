//! Healing calculation and application.

use crate::config::CombatConfig;
use crate::stats::CombatAttributes;

/// Calculate the healing produced by a healer.
///
/// # Formula
///
/// ```text
/// healing = base_healing(medical_rank) + intelligence / 1000
/// ```
///
/// | rank            | base |
/// |-----------------|------|
/// | NoviceMedic     | 50   |
/// | FieldMedic      | 100  |
/// | MasterMedic     | 200  |
/// | LegendaryHealer | 400  |
pub fn calculate_healing(healer: &CombatAttributes) -> u32 {
    healer
        .medical_rank
        .base_healing()
        .saturating_add(healer.intelligence / CombatConfig::STAT_SCALE)
}

/// Apply healing to current HP.
///
/// # Returns
///
/// New HP value (clamped to `max_hp`)
pub fn apply_healing(current_hp: u32, max_hp: u32, amount: u32) -> u32 {
    current_hp.saturating_add(amount).min(max_hp)
}
