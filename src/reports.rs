use crate::entities::{Clock, Entry, MonthlyReport, MoodCounts, Period, Summary};
use crate::infrastructure::{EntryRepository, ReportCache, Summarizer};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Where a period's summary came from on this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryOrigin {
    Cached,
    Fresh,
}

/// One period's outcome, as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodReport {
    pub report: MonthlyReport,
    pub is_current: bool,
    pub origin: SummaryOrigin,
    /// Entries per day, for the activity series.
    pub daily_counts: BTreeMap<NaiveDate, usize>,
}

/// Entries bucketed by month, each bucket in insertion order.
pub fn group_by_period(entries: &[Entry]) -> BTreeMap<Period, Vec<&Entry>> {
    let mut groups: BTreeMap<Period, Vec<&Entry>> = BTreeMap::new();
    for entry in entries {
        groups.entry(entry.period()).or_default().push(entry);
    }
    groups
}

pub fn daily_counts(entries: &[&Entry]) -> BTreeMap<NaiveDate, usize> {
    let mut counts = BTreeMap::new();
    for entry in entries {
        *counts.entry(entry.date).or_insert(0) += 1;
    }
    counts
}

/// Newline-joined texts, the payload handed to the summarizer.
pub fn concatenate(entries: &[&Entry]) -> String {
    entries
        .iter()
        .map(|e| e.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_report(period: Period, entries: &[&Entry], summary: Summary) -> MonthlyReport {
    let mood_counts = MoodCounts::tally(entries.iter().copied());
    MonthlyReport {
        period,
        total_entries: entries.len(),
        dominant_mood: mood_counts.dominant(),
        mood_counts,
        summary,
    }
}

pub struct ReportPipeline<'a, E: ?Sized, C: ?Sized, S: ?Sized> {
    entries: &'a E,
    cache: &'a C,
    summarizer: &'a S,
    clock: &'a dyn Clock,
}

impl<'a, E, C, S> ReportPipeline<'a, E, C, S>
where
    E: EntryRepository + ?Sized,
    C: ReportCache + ?Sized,
    S: Summarizer + ?Sized,
{
    pub fn new(entries: &'a E, cache: &'a C, summarizer: &'a S, clock: &'a dyn Clock) -> Self {
        Self {
            entries,
            cache,
            summarizer,
            clock,
        }
    }

    /// Build reports for every month that has entries, most recent first.
    ///
    /// Past months reuse a cached summary when one exists; otherwise a fresh
    /// one is requested and, unless it failed, cached. The current month is
    /// always recomputed and never cached. Storage failures abort the run;
    /// summarizer failures only affect their own month.
    pub fn run(&self) -> Result<Vec<PeriodReport>> {
        let entries = self.entries.load_all().context("Failed to load entries")?;
        let mut book = self
            .cache
            .load_reports()
            .context("Failed to load report cache")?;
        if book.is_empty() {
            log::debug!("Report cache is empty, every month will be summarized");
        }
        let current = self.clock.current_period();

        let groups = group_by_period(&entries);
        let mut reports = Vec::with_capacity(groups.len());

        for (period, period_entries) in groups.iter().rev() {
            let period = *period;
            let is_current = period == current;

            let cached = if is_current {
                None
            } else {
                book.get(period).map(|r| r.summary.clone())
            };

            let (summary, origin) = match cached {
                Some(summary) => {
                    log::debug!("Reusing cached summary for {period}");
                    (summary, SummaryOrigin::Cached)
                }
                None => (
                    self.fresh_summary(period, period_entries),
                    SummaryOrigin::Fresh,
                ),
            };

            let report = build_report(period, period_entries, summary);
            if origin == SummaryOrigin::Fresh && !is_current && report.summary.is_cacheable() {
                log::info!("Caching report for {period}");
                book.upsert(report.clone());
            }

            reports.push(PeriodReport {
                report,
                is_current,
                origin,
                daily_counts: daily_counts(period_entries),
            });
        }

        self.cache
            .save_reports(&book)
            .context("Failed to save report cache")?;

        Ok(reports)
    }

    fn fresh_summary(&self, period: Period, entries: &[&Entry]) -> Summary {
        let text = concatenate(entries);
        if text.trim().is_empty() {
            return Summary::NothingRecorded;
        }

        log::info!("Requesting summary for {period}");
        match self.summarizer.summarize(&text) {
            Ok(summary) => Summary::Generated(summary),
            Err(e) => {
                log::warn!("Summary for {period} failed, will retry next run: {e}");
                Summary::Failed(e.to_string())
            }
        }
    }
}

/// Convenience wrapper for a one-off run.
pub fn generate_reports<E, C, S>(
    entries: &E,
    cache: &C,
    summarizer: &S,
    clock: &dyn Clock,
) -> Result<Vec<PeriodReport>>
where
    E: EntryRepository + ?Sized,
    C: ReportCache + ?Sized,
    S: Summarizer + ?Sized,
{
    ReportPipeline::new(entries, cache, summarizer, clock).run()
}
