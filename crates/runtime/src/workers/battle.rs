//! Battle worker that owns one authoritative [`Battle`].
//!
//! Receives commands from [`crate::BattleHandle`], runs them through
//! [`BattleEngine`], then notifies observers, updates cross-battle
//! membership and publishes events, in that order. Commands are processed one
//! at a time, so every operation on a battle is serialized.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use combat_core::{
    ActionOutcome, Battle, BattleEngine, BattleError, BattleId, CharacterId, CombatAction,
    CombatEvent, Participant, Position, TurnEndReason,
};

use super::now;
use super::timer::{TurnExpired, TurnTimers};
use crate::api::Result;
use crate::events::{BattleEvent, Event, EventBus};
use crate::observers::ObserverRegistry;
use crate::oracle::CombatOracles;
use crate::registry::BattleRegistry;

/// Commands that can be sent to a battle worker
pub(crate) enum BattleCommand {
    Join {
        character: CharacterId,
        position: Option<Position>,
        reply: oneshot::Sender<Result<Participant>>,
    },
    Start {
        reply: oneshot::Sender<Result<Vec<CharacterId>>>,
    },
    SubmitAction {
        action: CombatAction,
        reply: oneshot::Sender<Result<ActionOutcome>>,
    },
    EndTurn {
        character: CharacterId,
        reply: oneshot::Sender<Result<()>>,
    },
    Ready {
        character: CharacterId,
        reply: oneshot::Sender<Result<Vec<CombatEvent>>>,
    },
    Pause {
        reply: oneshot::Sender<Result<()>>,
    },
    Resume {
        reply: oneshot::Sender<Result<()>>,
    },
    Snapshot {
        reply: oneshot::Sender<Battle>,
    },
    Shutdown,
}

/// Background task that processes commands for one battle.
pub(crate) struct BattleWorker {
    battle: Battle,
    oracles: CombatOracles,
    registry: BattleRegistry,
    observers: ObserverRegistry,
    event_bus: EventBus,
    timers: TurnTimers,
    command_rx: mpsc::Receiver<BattleCommand>,
    expired_rx: mpsc::Receiver<TurnExpired>,
}

impl BattleWorker {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        battle: Battle,
        oracles: CombatOracles,
        registry: BattleRegistry,
        observers: ObserverRegistry,
        event_bus: EventBus,
        turn_timeout: Option<Duration>,
        command_rx: mpsc::Receiver<BattleCommand>,
        timer_buffer: usize,
    ) -> Self {
        let (expired_tx, expired_rx) = mpsc::channel(timer_buffer.max(1));
        Self {
            battle,
            oracles,
            registry,
            observers,
            event_bus,
            timers: TurnTimers::new(turn_timeout, expired_tx),
            command_rx,
            expired_rx,
        }
    }

    fn id(&self) -> BattleId {
        self.battle.id()
    }

    /// Main worker loop.
    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(BattleCommand::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(expired) = self.expired_rx.recv() => {
                    self.handle_turn_expired(expired);
                }
            }
        }

        self.timers.cancel_all();
        debug!(target: "runtime::battle", battle = %self.id(), "battle worker stopped");
    }

    fn handle_command(&mut self, command: BattleCommand) {
        match command {
            BattleCommand::Join {
                character,
                position,
                reply,
            } => {
                let result = self.join(character, position);
                if reply.send(result).is_err() {
                    debug!("Join reply channel closed (caller dropped)");
                }
            }
            BattleCommand::Start { reply } => {
                let result = self.start();
                if reply.send(result).is_err() {
                    debug!("Start reply channel closed (caller dropped)");
                }
            }
            BattleCommand::SubmitAction { action, reply } => {
                let result = self.submit_action(action);
                if reply.send(result).is_err() {
                    debug!("SubmitAction reply channel closed (caller dropped)");
                }
            }
            BattleCommand::EndTurn { character, reply } => {
                let result = self.end_turn(character, TurnEndReason::Voluntary);
                if reply.send(result).is_err() {
                    debug!("EndTurn reply channel closed (caller dropped)");
                }
            }
            BattleCommand::Ready { character, reply } => {
                let result = self.ready(character);
                if reply.send(result).is_err() {
                    debug!("Ready reply channel closed (caller dropped)");
                }
            }
            BattleCommand::Pause { reply } => {
                let result = self.pause();
                if reply.send(result).is_err() {
                    debug!("Pause reply channel closed (caller dropped)");
                }
            }
            BattleCommand::Resume { reply } => {
                let result = self.resume();
                if reply.send(result).is_err() {
                    debug!("Resume reply channel closed (caller dropped)");
                }
            }
            BattleCommand::Snapshot { reply } => {
                if reply.send(self.battle.clone()).is_err() {
                    debug!("Snapshot reply channel closed (caller dropped)");
                }
            }
            BattleCommand::Shutdown => {}
        }
    }

    fn join(&mut self, character: CharacterId, position: Option<Position>) -> Result<Participant> {
        let id = self.id();
        BattleEngine::new(&mut self.battle).check_joinable()?;
        let newly_claimed = self.registry.claim(character, id)?;

        let env = self.oracles.as_env();
        let joined = BattleEngine::new(&mut self.battle).join(&env, character, position);
        match joined {
            Ok(participant) => {
                debug!(
                    target: "runtime::battle",
                    battle = %id,
                    %character,
                    position = %participant.position(),
                    "participant joined"
                );
                self.settle(vec![CombatEvent::joined(&participant)]);
                Ok(participant)
            }
            Err(error) => {
                if newly_claimed {
                    self.release(character);
                }
                Err(error.into())
            }
        }
    }

    fn start(&mut self) -> Result<Vec<CharacterId>> {
        let order = BattleEngine::new(&mut self.battle).start(now())?;
        info!(target: "runtime::battle", battle = %self.id(), ?order, "battle started");

        self.timers.arm_all(order.iter().copied());
        self.settle(vec![CombatEvent::BattleStarted {
            order: order.clone(),
        }]);
        Ok(order)
    }

    fn submit_action(&mut self, action: CombatAction) -> Result<ActionOutcome> {
        let id = self.id();
        let env = self.oracles.as_env();
        let resolved = BattleEngine::new(&mut self.battle).submit_action(&env, &action, now());

        match resolved {
            Ok(outcome) => {
                debug!(
                    target: "runtime::battle",
                    battle = %id,
                    actor = %action.actor,
                    action = %action.action_type,
                    sequence = outcome.result.sequence,
                    damage = outcome.result.damage_dealt,
                    healing = outcome.result.healing_done,
                    "action resolved"
                );
                self.event_bus.publish(Event::ActionResolved {
                    battle: id,
                    result: outcome.result.clone(),
                });
                self.settle(outcome.events.clone());
                Ok(outcome)
            }
            Err(error) => {
                self.report_rejection(&action, error);
                Err(error.into())
            }
        }
    }

    fn report_rejection(&self, action: &CombatAction, error: BattleError) {
        match &error {
            BattleError::Transition(phase_error) => error!(
                target: "runtime::battle",
                battle = %self.id(),
                action = ?action,
                phase = phase_error.phase.as_ref(),
                error = %phase_error.error,
                "action execution failed and was rolled back"
            ),
            _ => debug!(
                target: "runtime::battle",
                battle = %self.id(),
                actor = %action.actor,
                action = %action.action_type,
                %error,
                "action rejected"
            ),
        }

        self.event_bus.publish(Event::ActionRejected {
            battle: self.id(),
            action: action.clone(),
            error,
        });
    }

    fn end_turn(&mut self, character: CharacterId, reason: TurnEndReason) -> Result<()> {
        let event = BattleEngine::new(&mut self.battle).end_turn(character, reason, now())?;
        self.timers.arm(character);
        self.settle(vec![event]);
        Ok(())
    }

    fn ready(&mut self, character: CharacterId) -> Result<Vec<CombatEvent>> {
        let events = BattleEngine::new(&mut self.battle).ready(character, now())?;
        if events.contains(&CombatEvent::RoundReset) {
            self.arm_active();
        }
        self.settle(events.clone());
        Ok(events)
    }

    fn pause(&mut self) -> Result<()> {
        let event = BattleEngine::new(&mut self.battle).pause()?;
        self.timers.cancel_all();
        info!(target: "runtime::battle", battle = %self.id(), "battle paused");
        self.settle(vec![event]);
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        let event = BattleEngine::new(&mut self.battle).resume()?;
        self.arm_active();
        info!(target: "runtime::battle", battle = %self.id(), "battle resumed");
        self.settle(vec![event]);
        Ok(())
    }

    fn handle_turn_expired(&mut self, expired: TurnExpired) {
        if !self.timers.is_current(&expired) {
            debug!(
                target: "runtime::battle",
                battle = %self.id(),
                character = %expired.character,
                "ignoring stale turn timer"
            );
            return;
        }

        debug!(
            target: "runtime::battle",
            battle = %self.id(),
            character = %expired.character,
            "turn timed out"
        );
        if let Err(error) = self.end_turn(expired.character, TurnEndReason::TimedOut) {
            self.timers.cancel(expired.character);
            debug!(
                target: "runtime::battle",
                battle = %self.id(),
                character = %expired.character,
                %error,
                "turn timeout not applied"
            );
        }
    }

    fn arm_active(&mut self) {
        let active: Vec<_> = self
            .battle
            .active_participants()
            .map(Participant::character_id)
            .collect();
        self.timers.arm_all(active);
    }

    /// Runs the post-commit steps for events of one operation.
    fn settle(&mut self, events: Vec<CombatEvent>) {
        let id = self.id();
        self.observers.notify(id, &events);

        for event in &events {
            if let Some(character) = event.released_character() {
                self.timers.cancel(character);
                self.release(character);
            }
            if let CombatEvent::BattleEnded { winner, reward } = event {
                self.timers.cancel_all();
                if let Err(error) = self.registry.retire(id) {
                    warn!(target: "runtime::battle", battle = %id, %error, "failed to retire battle");
                }
                info!(
                    target: "runtime::battle",
                    battle = %id,
                    ?winner,
                    experience = reward.map(|r| r.experience),
                    "battle finished"
                );
            }
        }

        for event in events {
            self.event_bus
                .publish(Event::Battle(BattleEvent::new(id, event)));
        }
    }

    fn release(&self, character: CharacterId) {
        if let Err(error) = self.registry.release(character, self.id()) {
            warn!(
                target: "runtime::battle",
                battle = %self.id(),
                %character,
                %error,
                "failed to release battle membership"
            );
        }
    }
}
