/// Lifecycle status of a battle.
///
/// ```text
/// Preparing ──start──▶ InProgress ──(≤1 active)──▶ Finished
///                        ▲     │
///                  resume│     │pause
///                        └─Paused
/// ```
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
pub enum BattleStatus {
    #[default]
    Preparing,
    InProgress,
    Paused,
    Finished,
}

impl BattleStatus {
    pub const fn is_finished(self) -> bool {
        matches!(self, BattleStatus::Finished)
    }
}

/// Kind of encounter; informational for collaborators.
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
pub enum BattleType {
    #[strum(serialize = "pve")]
    #[cfg_attr(feature = "serde", serde(rename = "pve"))]
    PvE,
    #[strum(serialize = "pvp")]
    #[cfg_attr(feature = "serde", serde(rename = "pvp"))]
    PvP,
    Mission,
    #[default]
    Training,
}
