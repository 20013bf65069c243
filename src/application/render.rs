use crate::entities::{Entry, Mood, Summary};
use crate::infrastructure::records::DATE_FORMAT;
use crate::reports::{PeriodReport, SummaryOrigin};
use std::io::{self, Write};

const BAR_GLYPH: char = '▇';

/// Plain-text rendering for the terminal.
pub struct TextRenderer;

impl TextRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render_entry(&self, out: &mut dyn Write, entry: &Entry) -> io::Result<()> {
        writeln!(out, "🗓 {}", entry.date.format(DATE_FORMAT))?;
        writeln!(out, "Feeling: {} {}", entry.mood, entry.mood.emoji())?;
        for line in entry.text.lines() {
            writeln!(out, "  > {line}")?;
        }
        Ok(())
    }

    pub fn render_history(&self, out: &mut dyn Write, entries: &[Entry]) -> io::Result<()> {
        if entries.is_empty() {
            return writeln!(out, "No thoughts saved yet. Use `add` to record your first one.");
        }
        for (idx, entry) in entries.iter().enumerate() {
            if idx > 0 {
                writeln!(out)?;
            }
            self.render_entry(out, entry)?;
        }
        Ok(())
    }

    pub fn render_report(&self, out: &mut dyn Write, period_report: &PeriodReport) -> io::Result<()> {
        let report = &period_report.report;
        let marker = if period_report.is_current {
            " (in progress)"
        } else {
            ""
        };
        writeln!(out, "## 🗓 {}{}", report.period.label(), marker)?;

        let counts = Mood::ALL
            .iter()
            .map(|mood| format!("{} {}: {}", mood.emoji(), mood, report.mood_counts.get(*mood)))
            .collect::<Vec<_>>()
            .join("   ");
        writeln!(out, "{counts}")?;

        writeln!(out, "Total entries: {}", report.total_entries)?;
        match report.dominant_mood {
            Some(mood) => writeln!(out, "Most frequent feeling: {mood}")?,
            None => writeln!(out, "Most frequent feeling: N/A")?,
        }

        if !period_report.daily_counts.is_empty() {
            writeln!(out, "Thoughts added over time:")?;
            for (day, count) in &period_report.daily_counts {
                let bar: String = std::iter::repeat_n(BAR_GLYPH, *count).collect();
                writeln!(out, "  {} {} {}", day.format(DATE_FORMAT), bar, count)?;
            }
        }

        let heading = match (&report.summary, period_report.origin) {
            (Summary::Failed(_), _) => "AI Insight (unavailable)",
            (_, SummaryOrigin::Cached) => "AI Summary (cached)",
            (_, SummaryOrigin::Fresh) => "AI Insight",
        };
        writeln!(out, "🧠 {heading}")?;
        match &report.summary {
            Summary::Failed(reason) => {
                writeln!(out, "  {} ({reason})", report.summary.text())?;
            }
            summary => {
                for line in summary.text().lines() {
                    writeln!(out, "  {line}")?;
                }
            }
        }
        Ok(())
    }

    pub fn render_reports(&self, out: &mut dyn Write, reports: &[PeriodReport]) -> io::Result<()> {
        if reports.is_empty() {
            return writeln!(out, "No data available to generate reports.");
        }
        for (idx, report) in reports.iter().enumerate() {
            if idx > 0 {
                writeln!(out)?;
            }
            self.render_report(out, report)?;
        }
        Ok(())
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new()
    }
}
