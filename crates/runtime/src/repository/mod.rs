//! Storage adapters for battle records.

mod error;
mod file;
mod memory;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use file::{FileActionLog, FileLog};
pub use memory::InMemoryActionLog;
pub use traits::ActionLogRepository;
pub use types::ActionRecord;
