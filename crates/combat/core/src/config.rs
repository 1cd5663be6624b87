/// Combat rule constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatConfig {
    /// Grid size used when a battle is created without explicit dimensions.
    pub default_rows: u32,
    pub default_columns: u32,
}

impl CombatConfig {
    // ===== fixed rule constants =====
    /// Action points granted at battle start and restored on every turn end.
    pub const MAX_AP: u32 = 100;
    /// Floor applied to every successful damage roll.
    pub const MIN_DAMAGE: u32 = 1;
    /// Floor applied to a defender's computed defense value.
    pub const MIN_DEFENSE: u32 = 1;
    /// Divisor applied to skill×attribute products and stat-based bonuses.
    pub const STAT_SCALE: u32 = 1000;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_ROWS: u32 = 5;
    pub const DEFAULT_COLUMNS: u32 = 8;

    pub fn new() -> Self {
        Self {
            default_rows: Self::DEFAULT_ROWS,
            default_columns: Self::DEFAULT_COLUMNS,
        }
    }

    pub fn default_dimensions(&self) -> crate::state::GridDimensions {
        crate::state::GridDimensions::new(self.default_rows, self.default_columns)
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
