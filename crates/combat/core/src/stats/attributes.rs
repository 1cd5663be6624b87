//! Character attributes consumed by combat resolution.

use super::element::Element;

/// Attack category declared by an offensive action.
///
/// Each style pairs a trained skill with the attribute that governs it.
#[derive(
    Clone,
    Copy,
    Debug,
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
pub enum CombatStyle {
    /// Elemental techniques, governed by intelligence.
    Ninjutsu,
    /// Illusions, governed by willpower.
    Genjutsu,
    /// Weapon techniques, governed by strength.
    Bukijutsu,
    /// Hand-to-hand combat, governed by speed.
    Taijutsu,
}

/// Medical training of a character; determines base healing.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum MedicalRank {
    #[default]
    NoviceMedic,
    FieldMedic,
    MasterMedic,
    LegendaryHealer,
}

impl MedicalRank {
    pub const fn base_healing(self) -> u32 {
        match self {
            MedicalRank::NoviceMedic => 50,
            MedicalRank::FieldMedic => 100,
            MedicalRank::MasterMedic => 200,
            MedicalRank::LegendaryHealer => 400,
        }
    }
}

/// Career rank of a character, used for reward weighting.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Rank {
    #[default]
    Student,
    Genin,
    Chunin,
    Jounin,
    SpecialJounin,
    Kage,
    Elder,
}

impl Rank {
    /// Numeric tier, starting at 1 for [`Rank::Student`].
    pub const fn tier(self) -> u32 {
        match self {
            Rank::Student => 1,
            Rank::Genin => 2,
            Rank::Chunin => 3,
            Rank::Jounin => 4,
            Rank::SpecialJounin => 5,
            Rank::Kage => 6,
            Rank::Elder => 7,
        }
    }
}

/// Read-only snapshot of everything combat needs to know about a character.
///
/// Fetched from the character oracle each time an action resolves. Skill and
/// attribute values use the persistence layer's scale, where 1000 equals one
/// point of effective attack or defense.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatAttributes {
    pub strength: u32,
    pub intelligence: u32,
    pub speed: u32,
    pub willpower: u32,

    pub ninjutsu: u32,
    pub genjutsu: u32,
    pub bukijutsu: u32,
    pub taijutsu: u32,

    /// Sum of defense bonuses across equipped items.
    pub equipment_defense: u32,
    pub element: Element,
    pub medical_rank: MedicalRank,
    pub rank: Rank,

    pub hp: u32,
    pub max_hp: u32,
    pub cp: u32,
    pub sp: u32,
}

impl CombatAttributes {
    pub const DEFAULT_POOL: u32 = 100;
    pub const DEFAULT_STAT: u32 = 1;

    /// Skill level backing the given style.
    pub const fn skill(&self, style: CombatStyle) -> u32 {
        match style {
            CombatStyle::Ninjutsu => self.ninjutsu,
            CombatStyle::Genjutsu => self.genjutsu,
            CombatStyle::Bukijutsu => self.bukijutsu,
            CombatStyle::Taijutsu => self.taijutsu,
        }
    }

    /// Attribute that governs the given style.
    pub const fn governing_attribute(&self, style: CombatStyle) -> u32 {
        match style {
            CombatStyle::Ninjutsu => self.intelligence,
            CombatStyle::Genjutsu => self.willpower,
            CombatStyle::Bukijutsu => self.strength,
            CombatStyle::Taijutsu => self.speed,
        }
    }

    /// True when both resource pools cover the requested costs.
    pub const fn can_afford(&self, cp_cost: u32, sp_cost: u32) -> bool {
        self.cp >= cp_cost && self.sp >= sp_cost
    }

    /// HP a character enters battle with, never above its maximum.
    pub fn starting_hp(&self) -> u32 {
        self.hp.min(self.max_hp)
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    pub fn with_hp(mut self, hp: u32, max_hp: u32) -> Self {
        self.hp = hp;
        self.max_hp = max_hp;
        self
    }
}

impl Default for CombatAttributes {
    fn default() -> Self {
        Self {
            strength: Self::DEFAULT_STAT,
            intelligence: Self::DEFAULT_STAT,
            speed: Self::DEFAULT_STAT,
            willpower: Self::DEFAULT_STAT,
            ninjutsu: Self::DEFAULT_STAT,
            genjutsu: Self::DEFAULT_STAT,
            bukijutsu: Self::DEFAULT_STAT,
            taijutsu: Self::DEFAULT_STAT,
            equipment_defense: 0,
            element: Element::None,
            medical_rank: MedicalRank::NoviceMedic,
            rank: Rank::Student,
            hp: Self::DEFAULT_POOL,
            max_hp: Self::DEFAULT_POOL,
            cp: Self::DEFAULT_POOL,
            sp: Self::DEFAULT_POOL,
        }
    }
}
