//! Battle registry and cross-battle membership.
//!
//! A character may fight in at most one unfinished battle at a time. The
//! registry records which battle each character belongs to; battle workers
//! claim membership before a join and release it when the character is
//! defeated or flees. A finished battle is retired: its members are released
//! and it can no longer be looked up by id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;

use combat_core::{BattleId, CharacterId};

use crate::api::{BattleHandle, Result, RuntimeError};

#[derive(Default)]
struct RegistryState {
    next_id: u64,
    battles: HashMap<BattleId, BattleEntry>,
    members: HashMap<CharacterId, BattleId>,
}

struct BattleEntry {
    handle: BattleHandle,
    worker: Option<JoinHandle<()>>,
}

/// Shared registry of running battles.
#[derive(Clone, Default)]
pub struct BattleRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl BattleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn allocate_id(&self) -> Result<BattleId> {
        let mut state = self.lock()?;
        state.next_id += 1;
        Ok(BattleId(state.next_id))
    }

    pub(crate) fn insert(&self, handle: BattleHandle, worker: JoinHandle<()>) -> Result<()> {
        self.lock()?.battles.insert(
            handle.id(),
            BattleEntry {
                handle,
                worker: Some(worker),
            },
        );
        Ok(())
    }

    pub fn get(&self, id: BattleId) -> Result<BattleHandle> {
        self.lock()?
            .battles
            .get(&id)
            .map(|entry| entry.handle.clone())
            .ok_or(RuntimeError::UnknownBattle(id))
    }

    pub fn battle_ids(&self) -> Result<Vec<BattleId>> {
        let mut ids: Vec<_> = self.lock()?.battles.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }

    pub fn battle_of(&self, character: CharacterId) -> Result<Option<BattleId>> {
        Ok(self.lock()?.members.get(&character).copied())
    }

    /// Claims `character` for `battle`.
    ///
    /// Returns `true` when the claim is new. A character already claimed by
    /// the same battle is left to the engine's duplicate check.
    pub(crate) fn claim(&self, character: CharacterId, battle: BattleId) -> Result<bool> {
        let mut state = self.lock()?;
        match state.members.get(&character) {
            Some(&current) if current == battle => Ok(false),
            Some(&current) => Err(RuntimeError::AlreadyInBattle {
                character,
                battle: current,
            }),
            None => {
                state.members.insert(character, battle);
                Ok(true)
            }
        }
    }

    /// Releases `character` if it is still claimed by `battle`.
    pub(crate) fn release(&self, character: CharacterId, battle: BattleId) -> Result<()> {
        let mut state = self.lock()?;
        if state.members.get(&character) == Some(&battle) {
            state.members.remove(&character);
        }
        Ok(())
    }

    /// Forgets a finished battle and releases every character it claimed.
    ///
    /// The worker is detached rather than stopped: it keeps answering
    /// handles that callers still hold and exits once the last one is
    /// dropped.
    pub(crate) fn retire(&self, battle: BattleId) -> Result<()> {
        let mut state = self.lock()?;
        state.members.retain(|_, current| *current != battle);
        state.battles.remove(&battle);
        Ok(())
    }

    /// Takes every battle handle and worker task, for shutdown.
    pub(crate) fn drain(&self) -> Result<Vec<(BattleHandle, Option<JoinHandle<()>>)>> {
        let mut state = self.lock()?;
        state.members.clear();
        Ok(state
            .battles
            .drain()
            .map(|(_, entry)| (entry.handle, entry.worker))
            .collect())
    }

    fn lock(&self) -> Result<MutexGuard<'_, RegistryState>> {
        self.state.lock().map_err(|_| RuntimeError::RegistryPoisoned)
    }
}
