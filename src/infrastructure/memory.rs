use crate::entities::{Entry, ReportBook};
use crate::infrastructure::{EntryRepository, JournalStorage, ReportCache};
use anyhow::{Result, anyhow, bail};
use std::sync::{Mutex, MutexGuard};

/// Volatile storage for tests and embedding.
#[derive(Default)]
pub struct InMemoryStorage {
    entries: Mutex<Vec<Entry>>,
    reports: Mutex<ReportBook>,
    report_saves: Mutex<usize>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| anyhow!("in-memory storage lock poisoned"))
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<Entry>) -> Self {
        Self {
            entries: Mutex::new(entries),
            ..Self::default()
        }
    }

    /// How many times the full report cache has been written.
    pub fn report_saves(&self) -> Result<usize> {
        Ok(*lock(&self.report_saves)?)
    }
}

impl EntryRepository for InMemoryStorage {
    fn append(&self, entry: &Entry) -> Result<()> {
        lock(&self.entries)?.push(entry.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Entry>> {
        Ok(lock(&self.entries)?.clone())
    }

    fn backend_info(&self) -> &str {
        "in-memory storage"
    }
}

impl ReportCache for InMemoryStorage {
    fn load_reports(&self) -> Result<ReportBook> {
        Ok(lock(&self.reports)?.clone())
    }

    fn save_reports(&self, book: &ReportBook) -> Result<()> {
        if let Some(report) = book.iter().find(|r| !r.summary.is_cacheable()) {
            bail!("refusing to persist failed summary for {}", report.period);
        }
        *lock(&self.reports)? = book.clone();
        *lock(&self.report_saves)? += 1;
        Ok(())
    }
}

impl JournalStorage for InMemoryStorage {
    fn initialize(&self) -> Result<()> {
        Ok(())
    }
}
