//! Damage calculation and application.

use crate::config::CombatConfig;
use crate::stats::{CombatAttributes, CombatStyle, Element, apply_elemental};

// ============================================================================
// Attack & Defense
// ============================================================================

/// Effective attack of a character using the given style.
///
/// # Formula
///
/// ```text
/// attack = skill(style) * governing_attribute(style) / 1000
/// ```
///
/// | style     | skill     | attribute    |
/// |-----------|-----------|--------------|
/// | Ninjutsu  | ninjutsu  | intelligence |
/// | Genjutsu  | genjutsu  | willpower    |
/// | Bukijutsu | bukijutsu | strength     |
/// | Taijutsu  | taijutsu  | speed        |
///
/// An attack declared without a style has no effective attack and falls
/// through to the minimum damage rule.
pub fn attack_stat(attacker: &CombatAttributes, style: Option<CombatStyle>) -> u32 {
    let Some(style) = style else {
        return 0;
    };

    let product = u64::from(attacker.skill(style)) * u64::from(attacker.governing_attribute(style));
    let scaled = product / u64::from(CombatConfig::STAT_SCALE);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// Defense value of a character.
///
/// # Formula
///
/// ```text
/// defense = max(1, equipment_defense + (str + int + spd + wil) / 1000)
/// ```
pub fn defense_value(defender: &CombatAttributes) -> u32 {
    let stat_total = u64::from(defender.strength)
        + u64::from(defender.intelligence)
        + u64::from(defender.speed)
        + u64::from(defender.willpower);
    let stat_bonus = stat_total / u64::from(CombatConfig::STAT_SCALE);
    let total = u64::from(defender.equipment_defense) + stat_bonus;

    u32::try_from(total)
        .unwrap_or(u32::MAX)
        .max(CombatConfig::MIN_DEFENSE)
}

// ============================================================================
// Damage Calculation
// ============================================================================

/// Calculate damage dealt by one offensive action.
///
/// # Formula
///
/// ```text
/// base   = max(1, attack_stat(style) - defense_value(defender))
/// scaled = trunc(base * elemental_factor(element, defender.element))
/// final  = max(1, scaled)
/// ```
///
/// The elemental factor only applies when both the declared element and the
/// defender's element are set.
pub fn calculate_damage(
    attacker: &CombatAttributes,
    defender: &CombatAttributes,
    style: Option<CombatStyle>,
    element: Element,
) -> u32 {
    let base = attack_stat(attacker, style)
        .saturating_sub(defense_value(defender))
        .max(CombatConfig::MIN_DAMAGE);

    apply_elemental(base, element, defender.element).max(CombatConfig::MIN_DAMAGE)
}

/// Apply damage to current HP.
///
/// # Returns
///
/// New HP value (clamped to 0)
pub fn apply_damage(current_hp: u32, damage: u32) -> u32 {
    current_hp.saturating_sub(damage)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> CombatAttributes {
        CombatAttributes::default()
    }

    #[test]
    fn attack_stat_scales_skill_by_attribute() {
        let attacker = CombatAttributes {
            bukijutsu: 1000,
            strength: 1000,
            ..plain()
        };
        assert_eq!(attack_stat(&attacker, Some(CombatStyle::Bukijutsu)), 1000);
        assert_eq!(attack_stat(&attacker, Some(CombatStyle::Ninjutsu)), 0);
        assert_eq!(attack_stat(&attacker, None), 0);
    }

    #[test]
    fn attack_stat_does_not_overflow_on_large_values() {
        let attacker = CombatAttributes {
            ninjutsu: u32::MAX,
            intelligence: u32::MAX,
            ..plain()
        };
        assert_eq!(attack_stat(&attacker, Some(CombatStyle::Ninjutsu)), u32::MAX);
    }

    #[test]
    fn defense_is_floored_at_one() {
        assert_eq!(defense_value(&plain()), 1);
    }

    #[test]
    fn defense_adds_equipment_and_stat_bonus() {
        let defender = CombatAttributes {
            strength: 2000,
            intelligence: 1500,
            speed: 500,
            willpower: 999,
            equipment_defense: 7,
            ..plain()
        };
        // 4999 / 1000 = 4
        assert_eq!(defense_value(&defender), 11);
    }

    #[test]
    fn damage_never_drops_below_one() {
        let defender = CombatAttributes {
            equipment_defense: 10_000,
            ..plain()
        };
        assert_eq!(
            calculate_damage(&plain(), &defender, Some(CombatStyle::Taijutsu), Element::None),
            1
        );
        let halved = CombatAttributes {
            element: Element::Water,
            ..defender
        };
        assert_eq!(
            calculate_damage(&plain(), &halved, Some(CombatStyle::Taijutsu), Element::Fire),
            1
        );
    }

    #[test]
    fn heavy_weapon_strike_subtracts_minimum_defense() {
        let attacker = CombatAttributes {
            bukijutsu: 1000,
            strength: 1000,
            ..plain()
        };
        assert_eq!(
            calculate_damage(&attacker, &plain(), Some(CombatStyle::Bukijutsu), Element::None),
            999
        );
    }

    #[test]
    fn elemental_advantage_applies_after_defense() {
        let attacker = CombatAttributes {
            ninjutsu: 1000,
            intelligence: 101,
            ..plain()
        };
        let defender = plain().with_element(Element::Fire);
        // attack 101 - defense 1 = 100, then * 1.5
        assert_eq!(
            calculate_damage(&attacker, &defender, Some(CombatStyle::Ninjutsu), Element::Water),
            150
        );
    }

    #[test]
    fn apply_damage_clamps_to_zero() {
        assert_eq!(apply_damage(30, 12), 18);
        assert_eq!(apply_damage(30, 31), 0);
    }
}
