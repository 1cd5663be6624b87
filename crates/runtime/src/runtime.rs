//! High-level runtime orchestrator.
//!
//! The runtime owns the battle registry, the event bus and the persistence
//! worker, and exposes a builder-based API. Battle workers are spawned on
//! demand through [`RuntimeHandle::create_battle`].

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use combat_core::CombatConfig;

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::{EventBus, Topic};
use crate::observers::{CharacterSyncObserver, CombatObserver, ObserverRegistry};
use crate::oracle::{CharacterStore, CombatOracles, ItemCatalog};
use crate::registry::BattleRegistry;
use crate::repository::{ActionLogRepository, FileActionLog};
use crate::workers::{PersistenceCommand, PersistenceWorker};

/// Turn timeout used unless configured otherwise.
pub const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(30);

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub combat: CombatConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Idle time after which a participant's turn ends on its own. `None`
    /// disables turn timers.
    pub turn_timeout: Option<Duration>,
    /// Directory for the action log file; `None` disables file persistence.
    pub action_log_dir: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            combat: CombatConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
            turn_timeout: Some(DEFAULT_TURN_TIMEOUT),
            action_log_dir: None,
        }
    }
}

impl RuntimeConfig {
    /// Reads overrides from the environment.
    ///
    /// - `COMBAT_EVENT_BUFFER`, `COMBAT_COMMAND_BUFFER`: channel capacities
    /// - `COMBAT_TURN_TIMEOUT_SECS`: turn timeout, `0` disables timers
    /// - `COMBAT_ACTION_LOG_DIR`: enables the file action log
    /// - `COMBAT_GRID_ROWS`, `COMBAT_GRID_COLUMNS`: default grid size
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_env::<usize>("COMBAT_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("COMBAT_COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }

        if let Some(secs) = read_env::<u64>("COMBAT_TURN_TIMEOUT_SECS") {
            config.turn_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Ok(dir) = env::var("COMBAT_ACTION_LOG_DIR") {
            if !dir.is_empty() {
                config.action_log_dir = Some(PathBuf::from(dir));
            }
        }

        if let Some(rows) = read_env::<u32>("COMBAT_GRID_ROWS") {
            config.combat.default_rows = rows.max(1);
        }
        if let Some(columns) = read_env::<u32>("COMBAT_GRID_COLUMNS") {
            config.combat.default_columns = columns.max(1);
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

struct PersistenceHandle {
    command_tx: mpsc::Sender<PersistenceCommand>,
    task: JoinHandle<()>,
}

/// Main runtime that orchestrates battles
///
/// Runtime owns the background workers; [`RuntimeHandle`] is the cloneable
/// façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    persistence: Option<PersistenceHandle>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Writes every action resolved so far and flushes the log.
    ///
    /// Returns the number of records written by this runtime.
    pub async fn flush_action_log(&self) -> Result<u64> {
        let persistence = self
            .persistence
            .as_ref()
            .ok_or(RuntimeError::PersistenceDisabled)?;

        let (reply_tx, reply_rx) = oneshot::channel();
        persistence
            .command_tx
            .send(PersistenceCommand::Flush { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        Ok(reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)??)
    }

    /// Stops every battle worker, then the persistence worker.
    pub async fn shutdown(self) -> Result<()> {
        let battles = self.handle.registry().drain()?;
        info!(battles = battles.len(), "shutting down runtime");

        for (battle, worker) in battles {
            if let Err(error) = battle.shutdown().await {
                warn!(battle = %battle.id(), %error, "battle worker already stopped");
            }
            if let Some(worker) = worker {
                worker.await.map_err(RuntimeError::WorkerJoin)?;
            }
        }

        if let Some(persistence) = self.persistence {
            if persistence
                .command_tx
                .send(PersistenceCommand::Shutdown)
                .await
                .is_err()
            {
                warn!("persistence worker already stopped");
            }
            persistence.task.await.map_err(RuntimeError::WorkerJoin)?;
        }

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    characters: Option<CharacterStore>,
    items: ItemCatalog,
    observers: Vec<Arc<dyn CombatObserver>>,
    action_log: Option<Box<dyn ActionLogRepository>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            characters: None,
            items: ItemCatalog::new(),
            observers: Vec::new(),
            action_log: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the required character store
    pub fn characters(mut self, characters: CharacterStore) -> Self {
        self.characters = Some(characters);
        self
    }

    /// Set the item catalog (empty by default)
    pub fn items(mut self, items: ItemCatalog) -> Self {
        self.items = items;
        self
    }

    /// Adds an observer next to the built-in [`CharacterSyncObserver`].
    pub fn observer(mut self, observer: Arc<dyn CombatObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Use a specific action log instead of `action_log_dir`.
    pub fn action_log(mut self, log: impl ActionLogRepository + 'static) -> Self {
        self.action_log = Some(Box::new(log));
        self
    }

    pub fn turn_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.turn_timeout = timeout;
        self
    }

    /// Build the runtime
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn build(self) -> Result<Runtime> {
        let characters = self.characters.ok_or(RuntimeError::MissingOracles)?;
        let config = Arc::new(self.config);

        let mut observers = self.observers;
        observers.push(Arc::new(CharacterSyncObserver::new(characters.clone())));
        let observers = ObserverRegistry::new(observers);

        let oracles = CombatOracles::new(characters, self.items);
        let event_bus = EventBus::with_capacity(config.event_buffer_size);

        let action_log = match (self.action_log, &config.action_log_dir) {
            (Some(log), _) => Some(log),
            (None, Some(dir)) => {
                let filename = format!("actions_{}.log", chrono::Utc::now().format("%Y%m%d_%H%M%S"));
                let log = FileActionLog::open_or_create(dir, filename)?;
                info!(path = %log.path().display(), "action log enabled");
                Some(Box::new(log) as Box<dyn ActionLogRepository>)
            }
            (None, None) => None,
        };

        let persistence = action_log.map(|log| {
            let (command_tx, command_rx) = mpsc::channel(config.command_buffer_size);
            let worker =
                PersistenceWorker::new(log, event_bus.subscribe(Topic::Combat), command_rx);
            PersistenceHandle {
                command_tx,
                task: tokio::spawn(worker.run()),
            }
        });

        let handle = RuntimeHandle::new(
            BattleRegistry::new(),
            oracles,
            observers,
            event_bus,
            config,
        );

        Ok(Runtime {
            handle,
            persistence,
        })
    }
}
