//! In-memory action log.

use std::sync::{Arc, RwLock};

use super::traits::ActionLogRepository;
use super::types::ActionRecord;
use super::{RepositoryError, Result};

/// Action log kept in memory, for tests and ephemeral sessions.
///
/// Clones share the same storage, so a caller can keep one clone to inspect
/// records written by the persistence worker. Offsets are record indices.
#[derive(Clone, Default)]
pub struct InMemoryActionLog {
    session_id: String,
    records: Arc<RwLock<Vec<ActionRecord>>>,
}

impl InMemoryActionLog {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            records: Arc::default(),
        }
    }

    /// Snapshot of every record written so far.
    pub fn records(&self) -> Result<Vec<ActionRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned { store: "action log" })?;
        Ok(records.clone())
    }
}

impl ActionLogRepository for InMemoryActionLog {
    fn append(&mut self, record: &ActionRecord) -> Result<u64> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned { store: "action log" })?;
        records.push(record.clone());
        Ok(records.len() as u64 - 1)
    }

    fn read_at_offset(&self, offset: u64) -> Result<Option<(ActionRecord, u64)>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned { store: "action log" })?;
        Ok(usize::try_from(offset)
            .ok()
            .and_then(|index| records.get(index))
            .cloned()
            .map(|record| (record, offset + 1)))
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn size(&self) -> Result<u64> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned { store: "action log" })?;
        Ok(records.len() as u64)
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}
