use crate::entities::{Entry, MonthlyReport, Period, ReportBook};
use anyhow::Result;
use std::sync::Arc;

/// Durable, append-only sequence of entries.
pub trait EntryRepository {
    /// Persist one entry after all previously appended ones.
    fn append(&self, entry: &Entry) -> Result<()>;

    /// Every entry in insertion order. Empty when nothing was stored yet.
    fn load_all(&self) -> Result<Vec<Entry>>;

    fn backend_info(&self) -> &str;
}

/// Durable store of monthly reports keyed by period.
pub trait ReportCache {
    /// Read the whole cache into memory.
    fn load_reports(&self) -> Result<ReportBook>;

    /// Replace the whole cache with `book`.
    fn save_reports(&self, book: &ReportBook) -> Result<()>;

    fn lookup(&self, period: Period) -> Result<Option<MonthlyReport>> {
        Ok(self.load_reports()?.get(period).cloned())
    }

    fn upsert(&self, report: MonthlyReport) -> Result<()> {
        let mut book = self.load_reports()?;
        book.upsert(report);
        self.save_reports(&book)
    }
}

impl<T: EntryRepository + ?Sized> EntryRepository for Arc<T> {
    fn append(&self, entry: &Entry) -> Result<()> {
        (**self).append(entry)
    }

    fn load_all(&self) -> Result<Vec<Entry>> {
        (**self).load_all()
    }

    fn backend_info(&self) -> &str {
        (**self).backend_info()
    }
}

impl<T: ReportCache + ?Sized> ReportCache for Arc<T> {
    fn load_reports(&self) -> Result<ReportBook> {
        (**self).load_reports()
    }

    fn save_reports(&self, book: &ReportBook) -> Result<()> {
        (**self).save_reports(book)
    }

    fn lookup(&self, period: Period) -> Result<Option<MonthlyReport>> {
        (**self).lookup(period)
    }

    fn upsert(&self, report: MonthlyReport) -> Result<()> {
        (**self).upsert(report)
    }
}
