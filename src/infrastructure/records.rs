//! Persisted row shapes shared by the storage backends.

use crate::entities::{MonthlyReport, Mood, MoodCounts, Period, Summary};
use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Serde adapter storing dates as `dd/mm/yyyy`.
pub mod day_month_year {
    use super::DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Written when a report has no dominant mood.
pub const NO_DOMINANT_MOOD: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub month: u32,
    pub year: i32,
    pub total_thoughts: u64,
    pub most_frequent_emotion: String,
    pub happy_count: u64,
    pub sad_count: u64,
    pub angry_count: u64,
    pub ai_summary: String,
}

impl TryFrom<&MonthlyReport> for ReportRecord {
    type Error = anyhow::Error;

    fn try_from(report: &MonthlyReport) -> Result<Self> {
        if !report.summary.is_cacheable() {
            bail!("refusing to persist failed summary for {}", report.period);
        }

        Ok(Self {
            month: report.period.month,
            year: report.period.year,
            total_thoughts: report.total_entries as u64,
            most_frequent_emotion: report
                .dominant_mood
                .map(|mood| mood.as_str())
                .unwrap_or(NO_DOMINANT_MOOD)
                .to_string(),
            happy_count: report.mood_counts.happy as u64,
            sad_count: report.mood_counts.sad as u64,
            angry_count: report.mood_counts.angry as u64,
            ai_summary: report.summary.text().to_string(),
        })
    }
}

impl TryFrom<ReportRecord> for MonthlyReport {
    type Error = anyhow::Error;

    fn try_from(record: ReportRecord) -> Result<Self> {
        let period = Period::new(record.year, record.month)
            .ok_or_else(|| anyhow!("invalid month {} in report for {}", record.month, record.year))?;

        let dominant_mood = match record.most_frequent_emotion.as_str() {
            NO_DOMINANT_MOOD => None,
            other => Some(
                other
                    .parse::<Mood>()
                    .with_context(|| format!("bad dominant mood in report for {period}"))?,
            ),
        };

        Ok(Self {
            period,
            total_entries: record.total_thoughts as usize,
            dominant_mood,
            mood_counts: MoodCounts {
                happy: record.happy_count as usize,
                sad: record.sad_count as usize,
                angry: record.angry_count as usize,
            },
            summary: Summary::from_stored(record.ai_summary),
        })
    }
}
