//! Battle lifecycle and action execution pipeline.
//!
//! [`BattleEngine`] is the only way to mutate a [`Battle`]. Every operation
//! either succeeds completely or leaves the battle exactly as it was, and
//! successful operations report what happened as ordered [`CombatEvent`]s.

mod errors;
mod events;
mod transition;

pub use errors::{BattleError, TransitionPhase, TransitionPhaseError};
pub use events::{CombatEvent, TurnEndReason};

use std::cmp::Reverse;

use crate::action::{ActionEffect, ActionError, CombatAction, CombatActionResult};
use crate::combat::BattleReward;
use crate::env::CombatEnv;
use crate::state::{Battle, BattleStatus, CharacterId, Participant, Position, Timestamp};

/// Complete outcome of one resolved action.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionOutcome {
    pub result: CombatActionResult,
    /// Events in resolution order, ending with `BattleEnded` when the action
    /// decided the battle.
    pub events: Vec<CombatEvent>,
}

/// Engine borrowing a battle for the duration of one operation.
pub struct BattleEngine<'a> {
    battle: &'a mut Battle,
}

impl<'a> BattleEngine<'a> {
    pub fn new(battle: &'a mut Battle) -> Self {
        Self { battle }
    }

    pub fn battle(&self) -> &Battle {
        &*self.battle
    }

    // ===== Preparing =====

    /// Adds a character to a preparing battle.
    ///
    /// The requested cell is used when it is on the grid and free; otherwise
    /// the first free cell in row-major order is assigned.
    pub fn join(
        &mut self,
        env: &CombatEnv<'_>,
        character: CharacterId,
        requested: Option<Position>,
    ) -> Result<Participant, BattleError> {
        self.check_joinable()?;

        if self.battle.contains(character) {
            return Err(BattleError::AlreadyInBattle(character));
        }

        let attributes = env
            .attributes(character)
            .ok_or(BattleError::UnknownCharacter(character))?;

        let grid = self.battle.grid();
        let position = match requested {
            Some(position) if grid.can_move_to(position) => position,
            _ => grid.find_available_position()?,
        };

        let join_order = u32::try_from(self.battle.participants().len()).unwrap_or(u32::MAX);
        let participant = Participant::new(
            character,
            position,
            attributes.starting_hp(),
            attributes.max_hp,
            attributes.speed,
            join_order,
        );

        self.battle.grid_mut().place(character, position)?;
        self.battle.participants_mut().push(participant.clone());

        Ok(participant)
    }

    /// Fails unless the battle still accepts participants.
    pub fn check_joinable(&self) -> Result<(), BattleError> {
        match self.battle.status() {
            BattleStatus::Preparing => Ok(()),
            BattleStatus::Finished => Err(BattleError::BattleAlreadyEnded),
            status => Err(BattleError::BattleNotPreparing { status }),
        }
    }

    /// Moves the battle to `InProgress` and returns the initiative order.
    ///
    /// Participants are sorted by descending speed, ties keeping join order,
    /// and receive dense ranks starting at 1. Everyone starts with full AP
    /// and readiness cleared.
    pub fn start(&mut self, now: Timestamp) -> Result<Vec<CharacterId>, BattleError> {
        match self.battle.status() {
            BattleStatus::Preparing => {}
            BattleStatus::Finished => return Err(BattleError::BattleAlreadyEnded),
            status => return Err(BattleError::InvalidState { status }),
        }

        if self.battle.participants().is_empty() {
            return Err(BattleError::InsufficientParticipants);
        }

        let participants = self.battle.participants_mut();
        participants.sort_by_key(|p| Reverse(p.initiative()));
        for (index, participant) in participants.iter_mut().enumerate() {
            participant.set_initiative(u32::try_from(index + 1).unwrap_or(u32::MAX));
            participant.reset_turn(now);
        }
        let order = participants.iter().map(Participant::character_id).collect();

        self.battle.mark_started(now);
        Ok(order)
    }

    // ===== Administrative =====

    pub fn pause(&mut self) -> Result<CombatEvent, BattleError> {
        self.require_in_progress()?;
        self.battle.set_status(BattleStatus::Paused);
        Ok(CombatEvent::BattlePaused)
    }

    pub fn resume(&mut self) -> Result<CombatEvent, BattleError> {
        match self.battle.status() {
            BattleStatus::Paused => {
                self.battle.set_status(BattleStatus::InProgress);
                Ok(CombatEvent::BattleResumed)
            }
            BattleStatus::Finished => Err(BattleError::BattleAlreadyEnded),
            status => Err(BattleError::InvalidState { status }),
        }
    }

    // ===== InProgress =====

    /// Validates and resolves one action.
    ///
    /// Checks run in a fixed order and stop at the first failure: battle
    /// status, actor membership and activity, action shape, AP, CP/SP, then
    /// the action's own checks (move legality or target liveness).
    pub fn submit_action(
        &mut self,
        env: &CombatEnv<'_>,
        action: &CombatAction,
        now: Timestamp,
    ) -> Result<ActionOutcome, BattleError> {
        self.require_in_progress()?;

        let actor = action.actor;
        let participant = self
            .battle
            .participant(actor)
            .ok_or(BattleError::UnknownParticipant(actor))?;
        if !participant.is_active() {
            return Err(ActionError::ActorInactive(actor).into());
        }
        let available_ap = participant.current_ap();

        let kind = action.classify()?;

        if available_ap < action.ap_cost {
            return Err(ActionError::InsufficientAp {
                required: action.ap_cost,
                available: available_ap,
            }
            .into());
        }

        let (cp_cost, sp_cost) = action.resource_cost();
        if action.action_type.uses_resources() {
            let attributes = env
                .attributes(actor)
                .ok_or(ActionError::UnknownCharacter(actor))?;
            if !attributes.can_afford(cp_cost, sp_cost) {
                return Err(ActionError::InsufficientResources {
                    cp_required: cp_cost,
                    cp_available: attributes.cp,
                    sp_required: sp_cost,
                    sp_available: attributes.sp,
                }
                .into());
            }
        }

        let before = self.battle.clone();
        let effect = match transition::execute_transition(&kind, self.battle, env, now) {
            Ok(effect) => effect,
            Err(TransitionPhaseError {
                phase: TransitionPhase::PreValidate,
                error,
            }) => return Err(error.into()),
            Err(phase_error) => {
                *self.battle = before;
                return Err(BattleError::Transition(phase_error));
            }
        };

        let sequence = self.battle.advance_nonce();
        let mut events = Vec::new();

        if cp_cost > 0 || sp_cost > 0 {
            events.push(CombatEvent::ResourcesConsumed {
                character: actor,
                cp: cp_cost,
                sp: sp_cost,
            });
        }
        events.extend(self.effect_events(actor, &effect));

        if effect.removes_participant()
            && let Some(ended) = self.check_victory(env, now)
        {
            events.push(ended);
        }

        let result = CombatActionResult {
            battle_id: self.battle.id(),
            sequence,
            actor,
            action_type: action.action_type,
            target: effect.target(),
            ap_spent: action.ap_cost,
            cp_spent: cp_cost,
            sp_spent: sp_cost,
            damage_dealt: effect.damage_dealt(),
            healing_done: effect.healing_done(),
            effect,
            success: true,
            resolved_at: now,
        };

        Ok(ActionOutcome { result, events })
    }

    /// Ends a participant's turn, restoring its AP.
    pub fn end_turn(
        &mut self,
        character: CharacterId,
        reason: TurnEndReason,
        now: Timestamp,
    ) -> Result<CombatEvent, BattleError> {
        self.require_in_progress()?;
        let participant = self.active_participant_mut(character)?;
        participant.reset_turn(now);
        Ok(CombatEvent::TurnEnded { character, reason })
    }

    /// Marks a participant ready. Once every active participant is ready,
    /// all of them start a fresh turn together.
    pub fn ready(
        &mut self,
        character: CharacterId,
        now: Timestamp,
    ) -> Result<Vec<CombatEvent>, BattleError> {
        self.require_in_progress()?;
        self.active_participant_mut(character)?.set_ready(true);

        let mut events = vec![CombatEvent::ParticipantReady { character }];
        if self.battle.active_participants().all(Participant::is_ready) {
            self.battle
                .participants_mut()
                .iter_mut()
                .filter(|p| p.is_active())
                .for_each(|p| p.reset_turn(now));
            events.push(CombatEvent::RoundReset);
        }
        Ok(events)
    }

    // ===== internals =====

    fn require_in_progress(&self) -> Result<(), BattleError> {
        match self.battle.status() {
            BattleStatus::InProgress => Ok(()),
            BattleStatus::Finished => Err(BattleError::BattleAlreadyEnded),
            status => Err(BattleError::InvalidState { status }),
        }
    }

    fn active_participant_mut(
        &mut self,
        character: CharacterId,
    ) -> Result<&mut Participant, BattleError> {
        let participant = self
            .battle
            .participant_mut(character)
            .ok_or(BattleError::UnknownParticipant(character))?;
        if !participant.is_active() {
            return Err(ActionError::ActorInactive(character).into());
        }
        Ok(participant)
    }

    fn effect_events(&self, actor: CharacterId, effect: &ActionEffect) -> Vec<CombatEvent> {
        match *effect {
            ActionEffect::Moved { from, to } => vec![CombatEvent::Moved {
                character: actor,
                from,
                to,
            }],
            ActionEffect::Damaged {
                target,
                damage,
                remaining_hp,
                defeated,
            } => {
                let mut events = vec![CombatEvent::DamageDealt {
                    attacker: actor,
                    target,
                    amount: damage,
                    remaining_hp,
                }];
                if defeated {
                    events.push(CombatEvent::ParticipantDefeated {
                        character: target,
                        defeated_by: actor,
                    });
                }
                events
            }
            ActionEffect::Healed {
                target,
                amount,
                remaining_hp,
            } => vec![CombatEvent::HealingDone {
                healer: actor,
                target,
                amount,
                remaining_hp,
            }],
            ActionEffect::ItemUsed {
                item,
                target,
                effect,
                ..
            } => vec![CombatEvent::ItemUsed {
                character: actor,
                item,
                target,
                effect,
                remaining_hp: self
                    .battle
                    .participant(target)
                    .map(Participant::current_hp)
                    .unwrap_or_default(),
            }],
            ActionEffect::Fled { .. } => vec![CombatEvent::ParticipantFled { character: actor }],
        }
    }

    /// Finishes the battle once at most one participant is still fighting.
    fn check_victory(&mut self, env: &CombatEnv<'_>, now: Timestamp) -> Option<CombatEvent> {
        let (winner, contested) = {
            let mut active = self.battle.active_participants().map(Participant::character_id);
            (active.next(), active.next().is_some())
        };
        if contested {
            return None;
        }

        let reward = winner.map(|id| {
            let rank = env.attributes(id).map(|a| a.rank).unwrap_or_default();
            BattleReward::for_victory(self.battle.participants().len(), rank)
        });
        self.battle.mark_finished(winner, reward, now);

        Some(CombatEvent::BattleEnded { winner, reward })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::action::{InvalidActionReason, MoveRejection};
    use crate::env::ItemEffect;
    use crate::state::{BattleId, BattleType, GridDimensions, ItemId};
    use crate::stats::{CombatAttributes, CombatStyle, Element, MedicalRank};

    const A: CharacterId = CharacterId(1);
    const B: CharacterId = CharacterId(2);
    const C: CharacterId = CharacterId(3);

    type Roster = BTreeMap<CharacterId, CombatAttributes>;

    fn roster(entries: &[(CharacterId, CombatAttributes)]) -> Roster {
        entries.iter().cloned().collect()
    }

    fn plain_roster(ids: &[CharacterId]) -> Roster {
        ids.iter()
            .map(|id| (*id, CombatAttributes::default()))
            .collect()
    }

    fn preparing() -> Battle {
        Battle::new(
            BattleId(1),
            BattleType::PvP,
            Some(GridDimensions::new(5, 8)),
            Timestamp(0),
        )
        .unwrap()
    }

    fn started(characters: &Roster, placements: &[(CharacterId, Position)]) -> Battle {
        let mut battle = preparing();
        let env = CombatEnv::new(characters);
        let mut engine = BattleEngine::new(&mut battle);
        for (id, position) in placements {
            engine.join(&env, *id, Some(*position)).unwrap();
        }
        engine.start(Timestamp(1)).unwrap();
        battle
    }

    fn submit(
        battle: &mut Battle,
        characters: &Roster,
        action: CombatAction,
    ) -> Result<ActionOutcome, BattleError> {
        let env = CombatEnv::new(characters);
        BattleEngine::new(battle).submit_action(&env, &action, Timestamp(50))
    }

    fn duelists() -> Roster {
        roster(&[
            (
                A,
                CombatAttributes {
                    bukijutsu: 1000,
                    strength: 1000,
                    ..CombatAttributes::default()
                },
            ),
            (B, CombatAttributes::default()),
        ])
    }

    // ===== lifecycle =====

    #[test]
    fn start_without_participants_is_rejected() {
        let mut battle = preparing();
        let result = BattleEngine::new(&mut battle).start(Timestamp(1));

        assert_eq!(result, Err(BattleError::InsufficientParticipants));
        assert_eq!(battle.status(), BattleStatus::Preparing);
        assert_eq!(battle.started_at(), None);
    }

    #[test]
    fn start_ranks_by_speed_and_breaks_ties_by_join_order() {
        let characters = roster(&[
            (A, CombatAttributes { speed: 5, ..CombatAttributes::default() }),
            (B, CombatAttributes { speed: 9, ..CombatAttributes::default() }),
            (C, CombatAttributes { speed: 5, ..CombatAttributes::default() }),
        ]);
        let battle = started(
            &characters,
            &[
                (A, Position::new(0, 0)),
                (B, Position::new(0, 1)),
                (C, Position::new(0, 2)),
            ],
        );

        let order: Vec<_> = battle
            .participants()
            .iter()
            .map(|p| (p.character_id(), p.initiative()))
            .collect();
        assert_eq!(order, vec![(B, 1), (A, 2), (C, 3)]);
        assert!(battle.participants().iter().all(|p| p.current_ap() == 100));
        assert!(battle.participants().iter().all(|p| !p.is_ready()));
        assert_eq!(battle.status(), BattleStatus::InProgress);
        assert_eq!(battle.started_at(), Some(Timestamp(1)));
    }

    #[test]
    fn join_falls_back_to_first_free_cell() {
        let characters = plain_roster(&[A, B, C]);
        let env = CombatEnv::new(&characters);
        let mut battle = preparing();
        let mut engine = BattleEngine::new(&mut battle);

        let a = engine.join(&env, A, Some(Position::new(0, 0))).unwrap();
        let b = engine.join(&env, B, Some(Position::new(0, 0))).unwrap();
        let c = engine.join(&env, C, Some(Position::new(9, 9))).unwrap();

        assert_eq!(a.position(), Position::new(0, 0));
        assert_eq!(b.position(), Position::new(0, 1));
        assert_eq!(c.position(), Position::new(0, 2));
        assert_eq!(battle.grid().occupant(Position::new(0, 1)), Some(B));
    }

    #[test]
    fn join_snapshots_capped_hp_and_speed() {
        let characters = roster(&[(
            A,
            CombatAttributes {
                speed: 42,
                ..CombatAttributes::default().with_hp(180, 150)
            },
        )]);
        let mut battle = preparing();
        let participant = BattleEngine::new(&mut battle)
            .join(&CombatEnv::new(&characters), A, None)
            .unwrap();

        assert_eq!(participant.current_hp(), 150);
        assert_eq!(participant.max_hp(), 150);
        assert_eq!(participant.initiative(), 42);
    }

    #[test]
    fn join_rejects_duplicates_unknown_characters_and_started_battles() {
        let characters = plain_roster(&[A, B]);
        let env = CombatEnv::new(&characters);
        let mut battle = preparing();
        let mut engine = BattleEngine::new(&mut battle);

        engine.join(&env, A, None).unwrap();
        assert_eq!(
            engine.join(&env, A, None),
            Err(BattleError::AlreadyInBattle(A))
        );
        assert_eq!(
            engine.join(&env, C, None),
            Err(BattleError::UnknownCharacter(C))
        );

        engine.start(Timestamp(1)).unwrap();
        assert_eq!(
            engine.join(&env, B, None),
            Err(BattleError::BattleNotPreparing {
                status: BattleStatus::InProgress
            })
        );
    }

    #[test]
    fn join_reports_grid_full() {
        let characters = plain_roster(&[A, B]);
        let env = CombatEnv::new(&characters);
        let mut battle = Battle::new(
            BattleId(9),
            BattleType::Training,
            Some(GridDimensions::new(1, 1)),
            Timestamp(0),
        )
        .unwrap();
        let mut engine = BattleEngine::new(&mut battle);

        engine.join(&env, A, None).unwrap();
        assert_eq!(
            engine.join(&env, B, None),
            Err(BattleError::Grid(crate::state::GridError::GridFull))
        );
    }

    #[test]
    fn pause_blocks_actions_until_resumed() {
        let characters = plain_roster(&[A, B]);
        let mut battle = started(&characters, &[(A, Position::new(0, 0)), (B, Position::new(0, 3))]);

        assert_eq!(
            BattleEngine::new(&mut battle).pause(),
            Ok(CombatEvent::BattlePaused)
        );
        assert_eq!(
            submit(&mut battle, &characters, CombatAction::movement(A, Position::new(1, 0), 1)),
            Err(BattleError::InvalidState {
                status: BattleStatus::Paused
            })
        );

        assert_eq!(
            BattleEngine::new(&mut battle).resume(),
            Ok(CombatEvent::BattleResumed)
        );
        assert!(
            submit(&mut battle, &characters, CombatAction::movement(A, Position::new(1, 0), 1))
                .is_ok()
        );
    }

    // ===== resolution =====

    #[test]
    fn heavy_weapon_strike_defeats_and_finishes_battle() {
        let characters = duelists();
        let mut battle = started(&characters, &[(A, Position::new(0, 0)), (B, Position::new(0, 3))]);

        let outcome = submit(
            &mut battle,
            &characters,
            CombatAction::attack(A, B, CombatStyle::Bukijutsu, 10),
        )
        .unwrap();

        // 1000 attack against the minimum defense of 1
        assert_eq!(outcome.result.damage_dealt, 999);
        assert!(outcome.result.success);

        let target = battle.participant(B).unwrap();
        assert_eq!(target.current_hp(), 0);
        assert!(target.is_defeated());
        assert!(!battle.grid().is_occupied(Position::new(0, 3)));

        assert_eq!(battle.status(), BattleStatus::Finished);
        assert_eq!(battle.winner(), Some(A));
        assert_eq!(battle.ended_at(), Some(Timestamp(50)));

        let reward = battle.reward().unwrap();
        assert_eq!(reward.experience, 200);
        assert_eq!(
            outcome.events,
            vec![
                CombatEvent::DamageDealt {
                    attacker: A,
                    target: B,
                    amount: 999,
                    remaining_hp: 0,
                },
                CombatEvent::ParticipantDefeated {
                    character: B,
                    defeated_by: A,
                },
                CombatEvent::BattleEnded {
                    winner: Some(A),
                    reward: Some(reward),
                },
            ]
        );
    }

    #[test]
    fn finished_battle_rejects_every_operation_unchanged() {
        let characters = duelists();
        let mut battle = started(&characters, &[(A, Position::new(0, 0)), (B, Position::new(0, 3))]);
        submit(
            &mut battle,
            &characters,
            CombatAction::attack(A, B, CombatStyle::Bukijutsu, 10),
        )
        .unwrap();
        let snapshot = battle.clone();
        let env = CombatEnv::new(&characters);

        assert_eq!(
            submit(&mut battle, &characters, CombatAction::movement(A, Position::new(1, 0), 1)),
            Err(BattleError::BattleAlreadyEnded)
        );
        let mut engine = BattleEngine::new(&mut battle);
        assert_eq!(engine.join(&env, C, None), Err(BattleError::BattleAlreadyEnded));
        assert_eq!(engine.start(Timestamp(99)), Err(BattleError::BattleAlreadyEnded));
        assert_eq!(
            engine.end_turn(A, TurnEndReason::Voluntary, Timestamp(99)),
            Err(BattleError::BattleAlreadyEnded)
        );
        assert_eq!(engine.pause(), Err(BattleError::BattleAlreadyEnded));
        assert_eq!(battle, snapshot);
    }

    #[test]
    fn battle_continues_while_two_remain() {
        let characters = roster(&[
            (
                A,
                CombatAttributes {
                    bukijutsu: 1000,
                    strength: 1000,
                    ..CombatAttributes::default()
                },
            ),
            (B, CombatAttributes::default()),
            (C, CombatAttributes::default()),
        ]);
        let mut battle = started(
            &characters,
            &[
                (A, Position::new(0, 0)),
                (B, Position::new(0, 3)),
                (C, Position::new(4, 7)),
            ],
        );

        let first = submit(
            &mut battle,
            &characters,
            CombatAction::weapon(A, B, 10),
        )
        .unwrap();
        assert!(!first.events.iter().any(CombatEvent::is_battle_end));
        assert_eq!(battle.status(), BattleStatus::InProgress);
        assert_eq!(battle.active_count(), 2);

        let second = submit(&mut battle, &characters, CombatAction::weapon(A, C, 10)).unwrap();
        assert!(second.events.last().is_some_and(CombatEvent::is_battle_end));
        assert_eq!(battle.winner(), Some(A));
        assert_eq!(second.result.sequence, 1);
    }

    #[test]
    fn move_must_declare_exact_distance() {
        let characters = plain_roster(&[A, B]);
        let mut battle = started(&characters, &[(A, Position::new(0, 0)), (B, Position::new(4, 7))]);
        let before = battle.clone();

        assert_eq!(
            submit(&mut battle, &characters, CombatAction::movement(A, Position::new(2, 3), 4)),
            Err(BattleError::Action(ActionError::InvalidMove(
                MoveRejection::CostMismatch {
                    declared: 4,
                    required: 5,
                }
            )))
        );
        assert_eq!(battle, before);

        let outcome =
            submit(&mut battle, &characters, CombatAction::movement(A, Position::new(2, 3), 5))
                .unwrap();
        let mover = battle.participant(A).unwrap();
        assert_eq!(mover.position(), Position::new(2, 3));
        assert_eq!(mover.current_ap(), 95);
        assert_eq!(battle.grid().occupant(Position::new(2, 3)), Some(A));
        assert!(!battle.grid().is_occupied(Position::new(0, 0)));
        assert_eq!(
            outcome.events,
            vec![CombatEvent::Moved {
                character: A,
                from: Position::new(0, 0),
                to: Position::new(2, 3),
            }]
        );
        assert_eq!(battle.status(), BattleStatus::InProgress);
    }

    #[test]
    fn move_into_occupied_cell_changes_nothing() {
        let characters = plain_roster(&[A, B]);
        let mut battle = started(&characters, &[(A, Position::new(0, 0)), (B, Position::new(0, 3))]);
        let before = battle.clone();

        assert_eq!(
            submit(&mut battle, &characters, CombatAction::movement(A, Position::new(0, 3), 3)),
            Err(BattleError::Action(ActionError::InvalidMove(MoveRejection::Occupied {
                position: Position::new(0, 3),
                occupant: B,
            })))
        );
        assert_eq!(battle, before);
    }

    #[test]
    fn move_off_grid_is_rejected() {
        let characters = plain_roster(&[A, B]);
        let mut battle = started(&characters, &[(A, Position::new(4, 7)), (B, Position::new(0, 0))]);

        assert_eq!(
            submit(&mut battle, &characters, CombatAction::movement(A, Position::new(5, 7), 1)),
            Err(BattleError::Action(ActionError::InvalidMove(
                MoveRejection::OutOfBounds(Position::new(5, 7))
            )))
        );
    }

    #[test]
    fn ap_is_checked_before_move_legality() {
        let characters = plain_roster(&[A, B]);
        let mut battle = started(&characters, &[(A, Position::new(0, 0)), (B, Position::new(0, 3))]);

        assert_eq!(
            submit(&mut battle, &characters, CombatAction::movement(A, Position::new(0, 3), 150)),
            Err(BattleError::Action(ActionError::InsufficientAp {
                required: 150,
                available: 100,
            }))
        );
    }

    #[test]
    fn jutsu_requires_cp_and_sp() {
        let characters = roster(&[
            (
                A,
                CombatAttributes {
                    cp: 5,
                    ..CombatAttributes::default()
                },
            ),
            (B, CombatAttributes::default()),
            (C, CombatAttributes::default()),
        ]);
        let mut battle = started(
            &characters,
            &[
                (A, Position::new(0, 0)),
                (B, Position::new(0, 3)),
                (C, Position::new(3, 3)),
            ],
        );

        assert_eq!(
            submit(
                &mut battle,
                &characters,
                CombatAction::jutsu(A, B, CombatStyle::Ninjutsu, 20, 10, 1),
            ),
            Err(BattleError::Action(ActionError::InsufficientResources {
                cp_required: 10,
                cp_available: 5,
                sp_required: 1,
                sp_available: 100,
            }))
        );

        let outcome = submit(
            &mut battle,
            &characters,
            CombatAction::jutsu(A, B, CombatStyle::Ninjutsu, 20, 5, 1),
        )
        .unwrap();
        assert_eq!(
            outcome.events.first(),
            Some(&CombatEvent::ResourcesConsumed {
                character: A,
                cp: 5,
                sp: 1,
            })
        );
        assert_eq!((outcome.result.cp_spent, outcome.result.sp_spent), (5, 1));
        assert_eq!(battle.participant(A).unwrap().current_ap(), 80);
    }

    #[test]
    fn elemental_jutsu_uses_declared_element() {
        let characters = roster(&[
            (
                A,
                CombatAttributes {
                    ninjutsu: 1000,
                    intelligence: 101,
                    ..CombatAttributes::default()
                },
            ),
            (
                B,
                CombatAttributes::default()
                    .with_element(Element::Fire)
                    .with_hp(500, 500),
            ),
        ]);
        let mut battle = started(&characters, &[(A, Position::new(0, 0)), (B, Position::new(0, 3))]);

        let outcome = submit(
            &mut battle,
            &characters,
            CombatAction::jutsu(A, B, CombatStyle::Ninjutsu, 30, 10, 10).with_element(Element::Water),
        )
        .unwrap();

        assert_eq!(outcome.result.damage_dealt, 150);
        assert_eq!(battle.participant(B).unwrap().current_hp(), 350);
    }

    #[test]
    fn heal_is_capped_by_max_hp() {
        let characters = roster(&[
            (
                A,
                CombatAttributes {
                    medical_rank: MedicalRank::MasterMedic,
                    taijutsu: 1000,
                    speed: 40,
                    ..CombatAttributes::default()
                },
            ),
            (B, CombatAttributes::default()),
            (C, CombatAttributes::default()),
        ]);
        let mut battle = started(
            &characters,
            &[
                (A, Position::new(0, 0)),
                (B, Position::new(0, 3)),
                (C, Position::new(3, 3)),
            ],
        );

        submit(
            &mut battle,
            &characters,
            CombatAction::attack(A, B, CombatStyle::Taijutsu, 10),
        )
        .unwrap();
        assert_eq!(battle.participant(B).unwrap().current_hp(), 61);

        let outcome = submit(&mut battle, &characters, CombatAction::heal(A, B, 10, 5, 5)).unwrap();
        assert_eq!(outcome.result.healing_done, 39);
        assert_eq!(battle.participant(B).unwrap().current_hp(), 100);
        assert!(!outcome.events.iter().any(CombatEvent::is_battle_end));
    }

    #[test]
    fn defeated_participants_cannot_be_healed_or_act() {
        let characters = roster(&[
            (
                A,
                CombatAttributes {
                    bukijutsu: 1000,
                    strength: 1000,
                    ..CombatAttributes::default()
                },
            ),
            (B, CombatAttributes::default()),
            (C, CombatAttributes::default()),
        ]);
        let mut battle = started(
            &characters,
            &[
                (A, Position::new(0, 0)),
                (B, Position::new(0, 3)),
                (C, Position::new(3, 3)),
            ],
        );
        submit(&mut battle, &characters, CombatAction::weapon(A, B, 10)).unwrap();

        assert_eq!(
            submit(&mut battle, &characters, CombatAction::heal(C, B, 10, 5, 5)),
            Err(BattleError::Action(ActionError::InvalidTarget(Some(B))))
        );
        assert_eq!(
            submit(&mut battle, &characters, CombatAction::flee(B, 5)),
            Err(BattleError::Action(ActionError::ActorInactive(B)))
        );
        assert!(battle.participant(B).unwrap().is_defeated());
    }

    #[test]
    fn targets_must_be_live_participants() {
        let characters = plain_roster(&[A, B]);
        let mut battle = started(&characters, &[(A, Position::new(0, 0)), (B, Position::new(0, 3))]);

        assert_eq!(
            submit(
                &mut battle,
                &characters,
                CombatAction::attack(A, C, CombatStyle::Taijutsu, 10),
            ),
            Err(BattleError::Action(ActionError::InvalidTarget(Some(C))))
        );

        let mut untargeted = CombatAction::attack(A, B, CombatStyle::Taijutsu, 10);
        untargeted.target = None;
        assert_eq!(
            submit(&mut battle, &characters, untargeted),
            Err(BattleError::Action(ActionError::InvalidAction(
                InvalidActionReason::MissingTarget
            )))
        );
    }

    #[test]
    fn unknown_actor_is_not_found() {
        let characters = plain_roster(&[A, B]);
        let mut battle = started(&characters, &[(A, Position::new(0, 0)), (B, Position::new(0, 3))]);

        assert_eq!(
            submit(&mut battle, &characters, CombatAction::flee(C, 10)),
            Err(BattleError::UnknownParticipant(C))
        );
    }

    #[test]
    fn fleeing_hands_victory_to_the_last_one_standing() {
        let characters = plain_roster(&[A, B]);
        let mut battle = started(&characters, &[(A, Position::new(0, 0)), (B, Position::new(0, 3))]);

        let outcome = submit(&mut battle, &characters, CombatAction::flee(A, 10)).unwrap();

        let fled = battle.participant(A).unwrap();
        assert!(fled.has_fled());
        assert!(!fled.is_defeated());
        assert!(!battle.grid().is_occupied(Position::new(0, 0)));
        assert_eq!(battle.winner(), Some(B));
        assert_eq!(
            outcome.events,
            vec![
                CombatEvent::ParticipantFled { character: A },
                CombatEvent::BattleEnded {
                    winner: Some(B),
                    reward: battle.reward(),
                },
            ]
        );
    }

    #[test]
    fn solo_battle_survives_actions_that_defeat_nobody() {
        let characters = plain_roster(&[A]);
        let mut battle = started(&characters, &[(A, Position::new(0, 0))]);

        submit(&mut battle, &characters, CombatAction::movement(A, Position::new(0, 1), 1)).unwrap();
        assert_eq!(battle.status(), BattleStatus::InProgress);

        let outcome = submit(
            &mut battle,
            &characters,
            CombatAction::attack(A, A, CombatStyle::Taijutsu, 10),
        )
        .unwrap();
        assert_eq!(outcome.result.damage_dealt, 1);
        assert!(!outcome.events.iter().any(CombatEvent::is_battle_end));

        let a = battle.participant(A).unwrap();
        assert_eq!(a.current_hp(), 99);
        assert!(!a.is_defeated());
        assert_eq!(battle.status(), BattleStatus::InProgress);
        assert_eq!(battle.winner(), None);
        assert_eq!(battle.reward(), None);
    }

    #[test]
    fn item_effects_come_from_the_item_oracle() {
        let characters = plain_roster(&[A, B]);
        let items: BTreeMap<ItemId, ItemEffect> =
            [(ItemId(1), ItemEffect::RestoreActionPoints(30))].into_iter().collect();
        let env = CombatEnv::new(&characters).with_items(&items);
        let mut battle = started(&characters, &[(A, Position::new(0, 0)), (B, Position::new(0, 3))]);

        let mut engine = BattleEngine::new(&mut battle);
        engine
            .submit_action(&env, &CombatAction::movement(A, Position::new(4, 4), 8), Timestamp(2))
            .unwrap();
        let outcome = engine
            .submit_action(&env, &CombatAction::item(A, ItemId(1), 10), Timestamp(3))
            .unwrap();
        assert_eq!(
            outcome.result.effect,
            ActionEffect::ItemUsed {
                item: ItemId(1),
                target: A,
                effect: ItemEffect::RestoreActionPoints(30),
                restored: 18,
            }
        );
        assert_eq!(battle.participant(A).unwrap().current_ap(), 100);

        let mut engine = BattleEngine::new(&mut battle);
        assert_eq!(
            engine.submit_action(&env, &CombatAction::item(A, ItemId(2), 10), Timestamp(4)),
            Err(BattleError::Action(ActionError::InvalidAction(
                InvalidActionReason::UnknownItem(ItemId(2))
            )))
        );
    }

    // ===== turns =====

    #[test]
    fn end_turn_restores_full_ap() {
        let characters = plain_roster(&[A, B]);
        let mut battle = started(&characters, &[(A, Position::new(0, 0)), (B, Position::new(0, 3))]);
        submit(&mut battle, &characters, CombatAction::movement(A, Position::new(3, 3), 6)).unwrap();

        let event = BattleEngine::new(&mut battle)
            .end_turn(A, TurnEndReason::TimedOut, Timestamp(70))
            .unwrap();

        assert_eq!(
            event,
            CombatEvent::TurnEnded {
                character: A,
                reason: TurnEndReason::TimedOut,
            }
        );
        let participant = battle.participant(A).unwrap();
        assert_eq!(participant.current_ap(), 100);
        assert_eq!(participant.last_action_at(), Some(Timestamp(70)));
    }

    #[test]
    fn round_resets_once_everyone_is_ready() {
        let characters = plain_roster(&[A, B]);
        let mut battle = started(&characters, &[(A, Position::new(0, 0)), (B, Position::new(0, 3))]);
        submit(&mut battle, &characters, CombatAction::movement(A, Position::new(1, 0), 1)).unwrap();
        submit(&mut battle, &characters, CombatAction::movement(B, Position::new(1, 3), 1)).unwrap();

        let mut engine = BattleEngine::new(&mut battle);
        assert_eq!(
            engine.ready(A, Timestamp(5)),
            Ok(vec![CombatEvent::ParticipantReady { character: A }])
        );
        assert!(engine.battle().participant(A).unwrap().is_ready());

        assert_eq!(
            engine.ready(B, Timestamp(6)),
            Ok(vec![
                CombatEvent::ParticipantReady { character: B },
                CombatEvent::RoundReset,
            ])
        );
        assert!(battle
            .participants()
            .iter()
            .all(|p| p.current_ap() == 100 && !p.is_ready()));
    }
}
