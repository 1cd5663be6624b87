//! Per-participant turn timers.
//!
//! Each active participant has at most one armed timer. Arming a timer
//! aborts the previous one; every timer carries a generation number so that
//! an expiry already queued before a re-arm is recognised as stale.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use combat_core::CharacterId;

/// Message sent to the battle worker when a turn timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TurnExpired {
    pub character: CharacterId,
    pub generation: u64,
}

struct ArmedTimer {
    generation: u64,
    task: JoinHandle<()>,
}

pub(crate) struct TurnTimers {
    timeout: Option<Duration>,
    expired_tx: mpsc::Sender<TurnExpired>,
    next_generation: u64,
    armed: HashMap<CharacterId, ArmedTimer>,
}

impl TurnTimers {
    /// `None` disables timers entirely.
    pub(crate) fn new(timeout: Option<Duration>, expired_tx: mpsc::Sender<TurnExpired>) -> Self {
        Self {
            timeout,
            expired_tx,
            next_generation: 0,
            armed: HashMap::new(),
        }
    }

    /// Starts a fresh turn timer for `character`, replacing any armed one.
    pub(crate) fn arm(&mut self, character: CharacterId) {
        let Some(timeout) = self.timeout else {
            return;
        };
        self.cancel(character);

        let generation = self.next_generation;
        self.next_generation += 1;

        let expired_tx = self.expired_tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let expired = TurnExpired {
                character,
                generation,
            };
            if expired_tx.send(expired).await.is_err() {
                debug!(%character, "turn timer fired after battle worker stopped");
            }
        });

        self.armed.insert(character, ArmedTimer { generation, task });
    }

    pub(crate) fn arm_all(&mut self, characters: impl IntoIterator<Item = CharacterId>) {
        for character in characters {
            self.arm(character);
        }
    }

    pub(crate) fn cancel(&mut self, character: CharacterId) {
        if let Some(timer) = self.armed.remove(&character) {
            timer.task.abort();
        }
    }

    pub(crate) fn cancel_all(&mut self) {
        for (_, timer) in self.armed.drain() {
            timer.task.abort();
        }
    }

    /// True when `expired` belongs to the character's currently armed timer.
    pub(crate) fn is_current(&self, expired: &TurnExpired) -> bool {
        self.armed
            .get(&expired.character)
            .is_some_and(|timer| timer.generation == expired.generation)
    }

    #[cfg(test)]
    pub(crate) fn armed_count(&self) -> usize {
        self.armed.len()
    }
}

impl Drop for TurnTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
