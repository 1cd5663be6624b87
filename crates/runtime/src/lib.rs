//! Runtime orchestration for grid-based ninja battles.
//!
//! This crate runs many battles concurrently on top of `combat-core`. Each
//! battle is owned by a single worker task that serializes its operations;
//! clients talk to it through [`BattleHandle`], and everything that happens
//! is broadcast on the topic-based [`EventBus`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`registry`] tracks running battles and which battle each character is in
//! - [`observers`] reacts to committed battle events (character write-back)
//! - [`oracle`] and [`repository`] provide data adapters reused by other crates
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod observers;
pub mod oracle;
pub mod registry;
pub mod repository;
pub mod runtime;

mod workers;

pub use api::{BattleHandle, Result, RuntimeError, RuntimeHandle};
pub use events::{BattleEvent, Event, EventBus, Topic};
pub use observers::{
    CharacterSyncObserver, CombatObserver, ObserverCriticality, ObserverError, ObserverRegistry,
};
pub use oracle::{CharacterStore, CombatOracles, ItemCatalog};
pub use registry::BattleRegistry;
pub use repository::{
    ActionLogRepository, ActionRecord, FileActionLog, FileLog, InMemoryActionLog,
    RepositoryError,
};
pub use runtime::{DEFAULT_TURN_TIMEOUT, Runtime, RuntimeBuilder, RuntimeConfig};
