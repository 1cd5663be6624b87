//! Worker tasks that back the runtime orchestration.
//!
//! Each battle is owned by one [`BattleWorker`]; turn timers and action log
//! persistence run beside it.

mod battle;
mod persistence;
mod timer;

pub(crate) use battle::{BattleCommand, BattleWorker};
pub(crate) use persistence::{PersistenceCommand, PersistenceWorker};

use chrono::Utc;

use combat_core::Timestamp;

/// Current wall-clock time as a combat timestamp.
pub(crate) fn now() -> Timestamp {
    Timestamp::from_millis(u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default())
}
