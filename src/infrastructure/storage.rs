use crate::infrastructure::repository::{EntryRepository, ReportCache};
use anyhow::Result;

/// Combined storage interface backing both the entry log and the report cache.
pub trait JournalStorage: EntryRepository + ReportCache {
    /// Prepare the backend (create directories, tables, etc.)
    fn initialize(&self) -> Result<()>;
}
