//! Append-only log file repository.
//!
//! Records are stored back to back as:
//! ```text
//! [u32 LE length][bincode record]
//! [u32 LE length][bincode record]
//! ...
//! ```

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};

use super::traits::ActionLogRepository;
use super::types::ActionRecord;
use super::{RepositoryError, Result};

const LENGTH_PREFIX: u64 = 4;
/// Upper bound on one encoded record, checked before a frame is allocated.
const MAX_RECORD_LEN: u32 = 1 << 20;
const WRITE_BUFFER: usize = 64 * 1024;

/// Action log backed by a file.
pub type FileActionLog = FileLog<ActionRecord>;

/// Generic append-only log of bincode records.
pub struct FileLog<T> {
    session_id: String,
    path: PathBuf,
    writer: BufWriter<File>,
    current_offset: u64,
    _record: PhantomData<T>,
}

impl<T> FileLog<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a new log, refusing to overwrite an existing file.
    pub fn create(base_dir: impl AsRef<Path>, filename: impl AsRef<str>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        std::fs::create_dir_all(base_dir)?;

        let filename = filename.as_ref();
        let path = base_dir.join(filename);
        if path.exists() {
            return Err(RepositoryError::LogAlreadyExists(path));
        }

        let file = OpenOptions::new().create_new(true).write(true).open(&path)?;
        tracing::debug!(path = %path.display(), "created action log");

        Ok(Self::from_file(filename, path, file, 0))
    }

    /// Opens an existing log for appending.
    pub fn open(base_dir: impl AsRef<Path>, filename: impl AsRef<str>) -> Result<Self> {
        let filename = filename.as_ref();
        let path = base_dir.as_ref().join(filename);

        let file = OpenOptions::new().append(true).open(&path)?;
        let offset = file.metadata()?.len();
        tracing::debug!(path = %path.display(), offset, "opened action log");

        Ok(Self::from_file(filename, path, file, offset))
    }

    /// Opens the log, creating the directory and file when missing.
    pub fn open_or_create(base_dir: impl AsRef<Path>, filename: impl AsRef<str>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        std::fs::create_dir_all(base_dir)?;

        let filename = filename.as_ref();
        let path = base_dir.join(filename);

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let offset = file.metadata()?.len();
        tracing::debug!(path = %path.display(), offset, "opened action log");

        Ok(Self::from_file(filename, path, file, offset))
    }

    fn from_file(filename: &str, path: PathBuf, file: File, current_offset: u64) -> Self {
        Self {
            session_id: filename.to_string(),
            path,
            writer: BufWriter::with_capacity(WRITE_BUFFER, file),
            current_offset,
            _record: PhantomData,
        }
    }

    /// Appends a record and returns the byte offset it starts at.
    pub fn append(&mut self, record: &T) -> Result<u64> {
        let offset = self.current_offset;

        let bytes = bincode::serialize(record)?;
        let len = u32::try_from(bytes.len())
            .ok()
            .filter(|len| *len <= MAX_RECORD_LEN)
            .ok_or(RepositoryError::RecordTooLarge(bytes.len()))?;

        self.writer.write_all(&len.to_le_bytes())?;
        self.writer.write_all(&bytes)?;
        self.current_offset += LENGTH_PREFIX + u64::from(len);

        Ok(offset)
    }

    /// Reads the record starting at `byte_offset`.
    ///
    /// Only flushed records are visible.
    pub fn read_at_offset(&self, byte_offset: u64) -> Result<Option<(T, u64)>> {
        let file = File::open(&self.path)?;
        let file_size = file.metadata()?.len();
        if byte_offset >= file_size {
            return Ok(None);
        }

        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(byte_offset))?;
        let entry = read_record(&mut reader, byte_offset)?;
        Ok(entry.map(|(record, len)| (record, byte_offset + len)))
    }

    /// Reads every record of a log file without opening it for writing.
    pub fn read_path(path: impl AsRef<Path>) -> Result<Vec<T>> {
        let mut reader = BufReader::new(File::open(path.as_ref())?);
        let mut records = Vec::new();
        let mut offset = 0;
        while let Some((record, len)) = read_record(&mut reader, offset)? {
            records.push(record);
            offset += len;
        }
        Ok(records)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn size(&self) -> u64 {
        self.current_offset
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Reads one length-prefixed record, returning it with its encoded length.
fn read_record<T, R>(reader: &mut R, offset: u64) -> Result<Option<(T, u64)>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut len_bytes = [0u8; 4];
    match reader.read_exact(&mut len_bytes) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let len = u32::from_le_bytes(len_bytes);
    if len > MAX_RECORD_LEN {
        return Err(RepositoryError::RecordTooLarge(len as usize));
    }

    let mut data = vec![0u8; len as usize];
    reader.read_exact(&mut data).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => RepositoryError::TruncatedRecord {
            offset,
            expected: len,
        },
        _ => RepositoryError::Io(e),
    })?;

    let record = bincode::deserialize(&data)?;
    Ok(Some((record, LENGTH_PREFIX + u64::from(len))))
}

impl<T> Drop for FileLog<T> {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!(log = %self.session_id, error = %e, "failed to flush log on drop");
        }
    }
}

impl ActionLogRepository for FileLog<ActionRecord> {
    fn append(&mut self, record: &ActionRecord) -> Result<u64> {
        FileLog::append(self, record)
    }

    fn read_at_offset(&self, offset: u64) -> Result<Option<(ActionRecord, u64)>> {
        FileLog::read_at_offset(self, offset)
    }

    fn flush(&mut self) -> Result<()> {
        FileLog::flush(self)
    }

    fn size(&self) -> Result<u64> {
        Ok(FileLog::size(self))
    }

    fn session_id(&self) -> &str {
        FileLog::session_id(self)
    }
}
