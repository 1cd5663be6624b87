//! Repository contract for the action log.

use super::Result;
use super::types::ActionRecord;

/// Append-only log of resolved actions.
///
/// Offsets are opaque positions returned by [`append`](Self::append) and
/// accepted by [`read_at_offset`](Self::read_at_offset); file logs use byte
/// offsets, in-memory logs use indices.
pub trait ActionLogRepository: Send {
    /// Appends a record and returns the offset it was written at.
    fn append(&mut self, record: &ActionRecord) -> Result<u64>;

    /// Reads the record at `offset`.
    ///
    /// Returns `None` past the end of the log, otherwise the record and the
    /// offset of the next one.
    fn read_at_offset(&self, offset: u64) -> Result<Option<(ActionRecord, u64)>>;

    /// Flush buffered writes to the backing store.
    fn flush(&mut self) -> Result<()>;

    /// Current size of the log in offset units.
    fn size(&self) -> Result<u64>;

    fn session_id(&self) -> &str;

    /// Reads every record from the start of the log.
    fn read_all(&self) -> Result<Vec<ActionRecord>> {
        let mut records = Vec::new();
        let mut offset = 0;
        while let Some((record, next)) = self.read_at_offset(offset)? {
            records.push(record);
            offset = next;
        }
        Ok(records)
    }
}
