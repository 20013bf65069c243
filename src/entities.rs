use crate::error::{JournalError, UnknownMood};
use crate::infrastructure::records::day_month_year;
use crate::infrastructure::{EntryRepository, HookRegistry, WriteContext};
use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

// ============================================================================
// Mood
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Happy,
    Sad,
    Angry,
}

impl Mood {
    /// Fixed precedence order, also used to break ties.
    pub const ALL: [Mood; 3] = [Mood::Happy, Mood::Sad, Mood::Angry];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Sad => "Sad",
            Mood::Angry => "Angry",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Mood::Happy => "😃",
            Mood::Sad => "😢",
            Mood::Angry => "😠",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = UnknownMood;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .into_iter()
            .find(|mood| mood.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownMood(s.to_string()))
    }
}

// ============================================================================
// Entry
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(with = "day_month_year")]
    pub date: NaiveDate,
    #[serde(rename = "emotion")]
    pub mood: Mood,
    #[serde(rename = "thought")]
    pub text: String,
}

impl Entry {
    pub fn new(date: NaiveDate, mood: Mood, text: impl Into<String>) -> Result<Self, JournalError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(JournalError::EmptyText);
        }
        Ok(Self { date, mood, text })
    }

    pub fn period(&self) -> Period {
        Period::of(self.date)
    }
}

// ============================================================================
// Period
// ============================================================================

/// A calendar month. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Full month name and year, e.g. "October 2026".
    pub fn label(&self) -> String {
        match self.first_day() {
            Some(day) => day.format("%B %Y").to_string(),
            None => format!("{:02}/{}", self.month, self.year),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

// ============================================================================
// Aggregates
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoodCounts {
    pub happy: usize,
    pub sad: usize,
    pub angry: usize,
}

impl MoodCounts {
    pub fn tally<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Self {
        let mut counts = Self::default();
        for entry in entries {
            counts.record(entry.mood);
        }
        counts
    }

    pub fn record(&mut self, mood: Mood) {
        match mood {
            Mood::Happy => self.happy += 1,
            Mood::Sad => self.sad += 1,
            Mood::Angry => self.angry += 1,
        }
    }

    pub fn get(&self, mood: Mood) -> usize {
        match mood {
            Mood::Happy => self.happy,
            Mood::Sad => self.sad,
            Mood::Angry => self.angry,
        }
    }

    pub fn total(&self) -> usize {
        self.happy + self.sad + self.angry
    }

    /// Mood with the highest count. Ties go to the earliest mood in
    /// [`Mood::ALL`]; `None` when nothing was counted.
    pub fn dominant(&self) -> Option<Mood> {
        let mut best: Option<(Mood, usize)> = None;
        for mood in Mood::ALL {
            let count = self.get(mood);
            if count > 0 && best.is_none_or(|(_, top)| count > top) {
                best = Some((mood, count));
            }
        }
        best.map(|(mood, _)| mood)
    }
}

// ============================================================================
// Reports
// ============================================================================

pub const NOTHING_RECORDED: &str = "No thoughts recorded.";
pub const SUMMARY_FAILED: &str = "AI summary generation failed.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    Generated(String),
    /// The period had no text to summarize.
    NothingRecorded,
    /// The summarizer failed; carries the reason. Never cached.
    Failed(String),
}

impl Summary {
    pub fn is_cacheable(&self) -> bool {
        !matches!(self, Summary::Failed(_))
    }

    pub fn text(&self) -> &str {
        match self {
            Summary::Generated(text) => text,
            Summary::NothingRecorded => NOTHING_RECORDED,
            Summary::Failed(_) => SUMMARY_FAILED,
        }
    }

    /// Inverse of [`Summary::text`] for persisted values.
    pub fn from_stored(text: String) -> Self {
        if text == NOTHING_RECORDED {
            Summary::NothingRecorded
        } else {
            Summary::Generated(text)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyReport {
    pub period: Period,
    pub total_entries: usize,
    pub dominant_mood: Option<Mood>,
    pub mood_counts: MoodCounts,
    pub summary: Summary,
}

/// In-memory view of the report cache, keyed by period.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportBook {
    reports: BTreeMap<Period, MonthlyReport>,
}

impl ReportBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, period: Period) -> Option<&MonthlyReport> {
        self.reports.get(&period)
    }

    pub fn upsert(&mut self, report: MonthlyReport) {
        self.reports.insert(report.period, report);
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Reports in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = &MonthlyReport> {
        self.reports.values()
    }
}

impl FromIterator<MonthlyReport> for ReportBook {
    fn from_iter<I: IntoIterator<Item = MonthlyReport>>(iter: I) -> Self {
        let mut book = Self::new();
        for report in iter {
            book.upsert(report);
        }
        book
    }
}

// ============================================================================
// Clock
// ============================================================================

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;

    fn current_period(&self) -> Period {
        Period::of(self.today())
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

// ============================================================================
// Journal
// ============================================================================

pub struct Journal {
    repository: Box<dyn EntryRepository>,
    clock: Arc<dyn Clock>,
    hooks: HookRegistry,
}

impl Journal {
    pub fn new(repository: Box<dyn EntryRepository>, clock: Arc<dyn Clock>) -> Self {
        Self::with_hooks(repository, clock, HookRegistry::new())
    }

    pub fn with_hooks(
        repository: Box<dyn EntryRepository>,
        clock: Arc<dyn Clock>,
        hooks: HookRegistry,
    ) -> Self {
        Self {
            repository,
            clock,
            hooks,
        }
    }

    /// Record a thought dated today. Blank text is rejected before anything
    /// touches storage.
    pub fn append(&self, mood: Mood, text: &str) -> Result<Entry, JournalError> {
        let entry = Entry::new(self.clock.today(), mood, text)?;
        self.repository.append(&entry)?;
        log::info!("Recorded {} thought for {}", entry.mood, entry.date);

        let context = WriteContext {
            backend: self.repository.backend_info().to_string(),
            written_at: Utc::now(),
        };
        self.hooks.execute_write_hooks(&context, &entry);

        Ok(entry)
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> Result<Vec<Entry>> {
        self.repository.load_all()
    }

    /// Entries newest first, optionally capped.
    pub fn history(&self, limit: Option<usize>) -> Result<Vec<Entry>> {
        let mut entries = self.repository.load_all()?;
        entries.reverse();
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }
}
