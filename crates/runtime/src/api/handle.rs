//! Cloneable façades for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] creates and looks up battles and exposes the event bus.
//! [`BattleHandle`] talks to one battle worker; every call is queued behind
//! the battle's earlier commands and resolves once the worker has applied it.
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::info;

use combat_core::{
    ActionOutcome, Battle, BattleError, BattleId, BattleType, CharacterId, CombatAction,
    CombatEvent, GridDimensions, Participant, Position,
};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::observers::ObserverRegistry;
use crate::oracle::{CharacterStore, CombatOracles};
use crate::registry::BattleRegistry;
use crate::runtime::RuntimeConfig;
use crate::workers::{self, BattleCommand, BattleWorker};

/// Client-facing handle to the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    registry: BattleRegistry,
    oracles: CombatOracles,
    observers: ObserverRegistry,
    event_bus: EventBus,
    config: Arc<RuntimeConfig>,
}

impl RuntimeHandle {
    pub(crate) fn new(
        registry: BattleRegistry,
        oracles: CombatOracles,
        observers: ObserverRegistry,
        event_bus: EventBus,
        config: Arc<RuntimeConfig>,
    ) -> Self {
        Self {
            registry,
            oracles,
            observers,
            event_bus,
            config,
        }
    }

    /// Creates a battle in `Preparing` and spawns its worker.
    ///
    /// Must be called from within a Tokio runtime. Without explicit
    /// dimensions the configured default grid is used.
    pub fn create_battle(
        &self,
        battle_type: BattleType,
        dimensions: Option<GridDimensions>,
    ) -> Result<BattleHandle> {
        let id = self.registry.allocate_id()?;
        let dimensions = dimensions.unwrap_or(self.config.combat.default_dimensions());
        let battle =
            Battle::new(id, battle_type, Some(dimensions), workers::now()).map_err(BattleError::from)?;

        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer_size);
        let handle = BattleHandle::new(id, command_tx);

        let worker = BattleWorker::new(
            battle,
            self.oracles.clone(),
            self.registry.clone(),
            self.observers.clone(),
            self.event_bus.clone(),
            self.config.turn_timeout,
            command_rx,
            self.config.command_buffer_size,
        );
        let task = tokio::spawn(worker.run());
        self.registry.insert(handle.clone(), task)?;

        info!(%id, %battle_type, rows = dimensions.rows, columns = dimensions.columns, "battle created");
        self.event_bus.publish(Event::BattleCreated {
            battle: id,
            battle_type,
            dimensions,
        });

        Ok(handle)
    }

    /// Looks up a battle by id.
    pub fn battle(&self, id: BattleId) -> Result<BattleHandle> {
        self.registry.get(id)
    }

    /// Battle the character is currently fighting in, if any.
    pub fn battle_of(&self, character: CharacterId) -> Result<Option<BattleId>> {
        self.registry.battle_of(character)
    }

    pub fn battle_ids(&self) -> Result<Vec<BattleId>> {
        self.registry.battle_ids()
    }

    pub fn characters(&self) -> &CharacterStore {
        self.oracles.characters()
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Combat` - Resolved/rejected actions and their effects
    /// - `Topic::Lifecycle` - Creation, joins, start, pause, end
    /// - `Topic::Turn` - Turn ends, readiness, round resets
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub(crate) fn registry(&self) -> &BattleRegistry {
        &self.registry
    }
}

/// Handle to a single battle worker
#[derive(Clone)]
pub struct BattleHandle {
    id: BattleId,
    command_tx: mpsc::Sender<BattleCommand>,
}

impl BattleHandle {
    pub(crate) fn new(id: BattleId, command_tx: mpsc::Sender<BattleCommand>) -> Self {
        Self { id, command_tx }
    }

    pub fn id(&self) -> BattleId {
        self.id
    }

    /// Adds a character, claiming its cross-battle membership.
    pub async fn join(
        &self,
        character: CharacterId,
        position: Option<Position>,
    ) -> Result<Participant> {
        self.request(|reply| BattleCommand::Join {
            character,
            position,
            reply,
        })
        .await?
    }

    /// Starts the battle, returning the initiative order.
    pub async fn start(&self) -> Result<Vec<CharacterId>> {
        self.request(|reply| BattleCommand::Start { reply }).await?
    }

    pub async fn submit_action(&self, action: CombatAction) -> Result<ActionOutcome> {
        self.request(|reply| BattleCommand::SubmitAction { action, reply })
            .await?
    }

    /// Ends the character's turn voluntarily and re-arms its turn timer.
    pub async fn end_turn(&self, character: CharacterId) -> Result<()> {
        self.request(|reply| BattleCommand::EndTurn { character, reply })
            .await?
    }

    /// Marks the character ready; returns the events it caused.
    pub async fn ready(&self, character: CharacterId) -> Result<Vec<CombatEvent>> {
        self.request(|reply| BattleCommand::Ready { character, reply })
            .await?
    }

    pub async fn pause(&self) -> Result<()> {
        self.request(|reply| BattleCommand::Pause { reply }).await?
    }

    pub async fn resume(&self) -> Result<()> {
        self.request(|reply| BattleCommand::Resume { reply }).await?
    }

    /// Read-only copy of the current battle state.
    pub async fn snapshot(&self) -> Result<Battle> {
        self.request(|reply| BattleCommand::Snapshot { reply }).await
    }

    pub(crate) async fn shutdown(&self) -> Result<()> {
        self.command_tx
            .send(BattleCommand::Shutdown)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> BattleCommand) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }
}
