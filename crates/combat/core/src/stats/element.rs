//! Elemental affinities and the interaction table.

/// Elemental affinity of a character or a technique.
///
/// Only the Fire/Water/Earth triangle has interactions today; the remaining
/// elements always resolve to a neutral multiplier.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Element {
    #[default]
    None,
    Fire,
    Water,
    Earth,
    Lightning,
    Wind,
    Ice,
}

/// Scaling factor applied to damage for an attacker/defender element pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Affinity {
    Advantage,
    Neutral,
    Disadvantage,
}

impl Affinity {
    /// Returns the factor as a numerator over [`Affinity::DENOMINATOR`].
    ///
    /// Kept as an integer ratio so that `damage * 1.5` truncates exactly the
    /// same way on every platform.
    pub const fn numerator(self) -> u64 {
        match self {
            Affinity::Advantage => 3,
            Affinity::Neutral => 2,
            Affinity::Disadvantage => 1,
        }
    }

    pub const DENOMINATOR: u64 = 2;
}

impl Element {
    /// Returns true for [`Element::None`].
    pub const fn is_none(self) -> bool {
        matches!(self, Element::None)
    }

    /// Looks up the interaction of `self` attacking `defender`.
    ///
    /// ```text
    /// Water → Fire   1.5    Fire  → Water  0.5
    /// Fire  → Earth  1.5    Earth → Fire   0.5
    /// Earth → Water  1.5    Water → Earth  0.5
    /// anything else  1.0
    /// ```
    pub const fn affinity_against(self, defender: Element) -> Affinity {
        match (self, defender) {
            (Element::Water, Element::Fire)
            | (Element::Fire, Element::Earth)
            | (Element::Earth, Element::Water) => Affinity::Advantage,
            (Element::Fire, Element::Water)
            | (Element::Earth, Element::Fire)
            | (Element::Water, Element::Earth) => Affinity::Disadvantage,
            _ => Affinity::Neutral,
        }
    }
}

/// Scales `damage` by the elemental interaction, truncating the product.
///
/// When either side has no element the damage is returned unchanged. The
/// result is not floored here; callers re-apply the minimum damage rule.
pub fn apply_elemental(damage: u32, attacker: Element, defender: Element) -> u32 {
    if attacker.is_none() || defender.is_none() {
        return damage;
    }

    let affinity = attacker.affinity_against(defender);
    let scaled = u64::from(damage) * affinity.numerator() / Affinity::DENOMINATOR;
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_against_fire_scales_by_one_and_a_half() {
        assert_eq!(apply_elemental(100, Element::Water, Element::Fire), 150);
    }

    #[test]
    fn disadvantage_halves_and_truncates() {
        assert_eq!(apply_elemental(100, Element::Fire, Element::Water), 50);
        assert_eq!(apply_elemental(3, Element::Earth, Element::Fire), 1);
        assert_eq!(apply_elemental(1, Element::Water, Element::Earth), 0);
    }

    #[test]
    fn advantage_truncates_odd_damage() {
        assert_eq!(apply_elemental(3, Element::Fire, Element::Earth), 4);
    }

    #[test]
    fn neutral_pairs_leave_damage_untouched() {
        assert_eq!(apply_elemental(40, Element::Fire, Element::Fire), 40);
        assert_eq!(apply_elemental(40, Element::Lightning, Element::Water), 40);
        assert_eq!(apply_elemental(40, Element::Wind, Element::Ice), 40);
    }

    #[test]
    fn missing_element_on_either_side_skips_table() {
        assert_eq!(apply_elemental(40, Element::None, Element::Fire), 40);
        assert_eq!(apply_elemental(40, Element::Water, Element::None), 40);
    }

    #[test]
    fn element_names_parse_case_insensitively() {
        assert_eq!("WATER".parse::<Element>(), Ok(Element::Water));
        assert_eq!(Element::Lightning.as_ref(), "lightning");
    }
}
