//! Battle aggregate: grid, participants and lifecycle bookkeeping.
//!
//! Fields are read through accessors only. Every mutation goes through
//! [`crate::engine::BattleEngine`], which keeps grid occupancy and
//! participant state consistent with each other.

use crate::combat::BattleReward;

use super::grid::{Grid, GridError};
use super::participant::Participant;
use super::status::{BattleStatus, BattleType};
use super::types::{BattleId, CharacterId, GridDimensions, Timestamp};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Battle {
    id: BattleId,
    battle_type: BattleType,
    status: BattleStatus,
    grid: Grid,
    /// Join order while preparing, initiative order once started.
    participants: Vec<Participant>,
    created_at: Timestamp,
    started_at: Option<Timestamp>,
    ended_at: Option<Timestamp>,
    winner: Option<CharacterId>,
    reward: Option<BattleReward>,
    /// Count of resolved actions; doubles as the sequence number of the next one.
    nonce: u64,
}

impl Battle {
    /// Creates a battle in [`BattleStatus::Preparing`].
    ///
    /// Without explicit dimensions the default 5×8 grid is used.
    pub fn new(
        id: BattleId,
        battle_type: BattleType,
        dimensions: Option<GridDimensions>,
        now: Timestamp,
    ) -> Result<Self, GridError> {
        let grid = Grid::new(dimensions.unwrap_or_default())?;

        Ok(Self {
            id,
            battle_type,
            status: BattleStatus::Preparing,
            grid,
            participants: Vec::new(),
            created_at: now,
            started_at: None,
            ended_at: None,
            winner: None,
            reward: None,
            nonce: 0,
        })
    }

    pub fn id(&self) -> BattleId {
        self.id
    }

    pub fn battle_type(&self) -> BattleType {
        self.battle_type
    }

    pub fn status(&self) -> BattleStatus {
        self.status
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, id: CharacterId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.character_id() == id)
    }

    pub fn contains(&self, id: CharacterId) -> bool {
        self.participant(id).is_some()
    }

    /// Participants still in the fight, in current order.
    pub fn active_participants(&self) -> impl Iterator<Item = &Participant> + '_ {
        self.participants.iter().filter(|p| p.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active_participants().count()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<Timestamp> {
        self.ended_at
    }

    pub fn winner(&self) -> Option<CharacterId> {
        self.winner
    }

    pub fn reward(&self) -> Option<BattleReward> {
        self.reward
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    // ===== crate-internal mutation, driven by the engine =====

    pub(crate) fn participant_mut(&mut self, id: CharacterId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.character_id() == id)
    }

    pub(crate) fn participants_mut(&mut self) -> &mut Vec<Participant> {
        &mut self.participants
    }

    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub(crate) fn set_status(&mut self, status: BattleStatus) {
        self.status = status;
    }

    pub(crate) fn mark_started(&mut self, now: Timestamp) {
        self.status = BattleStatus::InProgress;
        self.started_at = Some(now);
    }

    pub(crate) fn mark_finished(
        &mut self,
        winner: Option<CharacterId>,
        reward: Option<BattleReward>,
        now: Timestamp,
    ) {
        self.status = BattleStatus::Finished;
        self.ended_at = Some(now);
        self.winner = winner;
        self.reward = reward;
    }

    pub(crate) fn advance_nonce(&mut self) -> u64 {
        let sequence = self.nonce;
        self.nonce += 1;
        sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_battle_is_preparing_on_default_grid() {
        let battle = Battle::new(BattleId(1), BattleType::PvP, None, Timestamp(10)).unwrap();
        assert_eq!(battle.status(), BattleStatus::Preparing);
        assert_eq!(battle.grid().rows(), 5);
        assert_eq!(battle.grid().columns(), 8);
        assert!(battle.participants().is_empty());
        assert_eq!(battle.created_at(), Timestamp(10));
        assert_eq!(battle.started_at(), None);
    }

    #[test]
    fn custom_dimensions_are_validated() {
        let battle = Battle::new(
            BattleId(1),
            BattleType::Mission,
            Some(GridDimensions::new(3, 4)),
            Timestamp(0),
        )
        .unwrap();
        assert_eq!(battle.grid().dimensions(), GridDimensions::new(3, 4));

        assert!(
            Battle::new(
                BattleId(2),
                BattleType::Mission,
                Some(GridDimensions::new(3, 0)),
                Timestamp(0),
            )
            .is_err()
        );
    }

    #[test]
    fn battle_type_names_round_trip_through_strum() {
        assert_eq!("PVE".parse::<BattleType>(), Ok(BattleType::PvE));
        assert_eq!(BattleType::PvP.to_string(), "pvp");
        assert_eq!(BattleStatus::InProgress.as_ref(), "in_progress");
    }
}
