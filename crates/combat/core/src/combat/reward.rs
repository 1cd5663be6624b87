//! Victory rewards.

use crate::stats::Rank;

/// Reward granted to the winner of a finished battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleReward {
    pub experience: u32,
}

impl BattleReward {
    pub const BASE_EXPERIENCE: u32 = 100;
    pub const PER_PARTICIPANT: u32 = 25;
    pub const PER_RANK_TIER: u32 = 50;

    /// # Formula
    ///
    /// ```text
    /// experience = 100 + 25 * participants + 50 * rank_tier(winner)
    /// ```
    pub fn for_victory(participants: usize, winner_rank: Rank) -> Self {
        let participants = u32::try_from(participants).unwrap_or(u32::MAX);
        let experience = Self::BASE_EXPERIENCE
            .saturating_add(Self::PER_PARTICIPANT.saturating_mul(participants))
            .saturating_add(Self::PER_RANK_TIER.saturating_mul(winner_rank.tier()));
        Self { experience }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experience_grows_with_field_size_and_rank() {
        assert_eq!(BattleReward::for_victory(2, Rank::Student).experience, 200);
        assert_eq!(BattleReward::for_victory(4, Rank::Jounin).experience, 400);
    }
}
