use crate::entities::{Entry, MonthlyReport, Mood, Period, ReportBook};
use crate::infrastructure::records::{DATE_FORMAT, ReportRecord};
use crate::infrastructure::{EntryRepository, JournalStorage, ReportCache};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use duckdb::{Connection, OptionalExt, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Schema migrations, applied in order and recorded in `migrations`.
const MIGRATIONS: &[(i32, &str, &str)] = &[
    (
        1,
        "001_create_entries",
        include_str!("../../migrations/001_create_entries.sql"),
    ),
    (
        2,
        "002_create_reports",
        include_str!("../../migrations/002_create_reports.sql"),
    ),
];

const REPORT_COLUMNS: &str = "month, year, total_thoughts, most_frequent_emotion, \
     happy_count, sad_count, angry_count, ai_summary";

pub struct DuckDbStorage {
    conn: Mutex<Connection>,
}

impl DuckDbStorage {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path).context("Failed to open DuckDB connection")?;

        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.initialize()?;
        Ok(storage)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .context("Failed to create in-memory DuckDB connection")?;

        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.initialize()?;
        Ok(storage)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("DuckDB connection lock poisoned"))
    }

    /// Insert or overwrite the row for the record's period.
    fn write_report(conn: &Connection, record: &ReportRecord) -> Result<()> {
        conn.execute(
            &format!(
                "INSERT INTO reports ({REPORT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
                 ON CONFLICT (year, month) DO UPDATE SET \
                 total_thoughts = excluded.total_thoughts, \
                 most_frequent_emotion = excluded.most_frequent_emotion, \
                 happy_count = excluded.happy_count, \
                 sad_count = excluded.sad_count, \
                 angry_count = excluded.angry_count, \
                 ai_summary = excluded.ai_summary"
            ),
            params![
                (record.month as i32),
                record.year,
                (record.total_thoughts as i64),
                record.most_frequent_emotion,
                (record.happy_count as i64),
                (record.sad_count as i64),
                (record.angry_count as i64),
                record.ai_summary,
            ],
        )
        .context("Failed to write report")?;

        Ok(())
    }

    fn read_report(row: &duckdb::Row<'_>) -> duckdb::Result<ReportRecord> {
        Ok(ReportRecord {
            month: row.get::<_, i32>(0)? as u32,
            year: row.get(1)?,
            total_thoughts: row.get::<_, i64>(2)? as u64,
            most_frequent_emotion: row.get(3)?,
            happy_count: row.get::<_, i64>(4)? as u64,
            sad_count: row.get::<_, i64>(5)? as u64,
            angry_count: row.get::<_, i64>(6)? as u64,
            ai_summary: row.get(7)?,
        })
    }
}

impl EntryRepository for DuckDbStorage {
    fn append(&self, entry: &Entry) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO entries (date, emotion, thought) VALUES (?, ?, ?)",
            params![
                entry.date.format(DATE_FORMAT).to_string(),
                entry.mood.as_str(),
                entry.text,
            ],
        )
        .context("Failed to save entry")?;
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Entry>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT date, emotion, thought FROM entries ORDER BY id")
            .context("Failed to prepare select statement")?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (date_str, emotion, text) = row?;
            let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                .with_context(|| format!("Failed to parse entry date '{date_str}'"))?;
            let mood = emotion
                .parse::<Mood>()
                .context("Failed to parse entry emotion")?;
            entries.push(Entry { date, mood, text });
        }

        Ok(entries)
    }

    fn backend_info(&self) -> &str {
        "DuckDB Storage Backend v1.0"
    }
}

impl ReportCache for DuckDbStorage {
    fn load_reports(&self) -> Result<ReportBook> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {REPORT_COLUMNS} FROM reports ORDER BY year, month"
            ))
            .context("Failed to prepare report query")?;

        let rows = stmt.query_map([], Self::read_report)?;

        let mut book = ReportBook::new();
        for record in rows {
            book.upsert(MonthlyReport::try_from(record?)?);
        }
        Ok(book)
    }

    fn save_reports(&self, book: &ReportBook) -> Result<()> {
        let records = book
            .iter()
            .map(ReportRecord::try_from)
            .collect::<Result<Vec<_>>>()?;

        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .context("Failed to begin report transaction")?;

        // Periods are overwritten in place; only rows absent from the book
        // are deleted, so no key is ever removed and re-inserted.
        let stored: Vec<(i32, i32)> = {
            let mut stmt = tx
                .prepare("SELECT year, month FROM reports")
                .context("Failed to prepare report key query")?;
            stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<duckdb::Result<_>>()?
        };
        for (year, month) in stored {
            let keep = Period::new(year, month as u32).is_some_and(|p| book.get(p).is_some());
            if !keep {
                tx.execute(
                    "DELETE FROM reports WHERE year = ? AND month = ?",
                    params![year, month],
                )
                .context("Failed to drop stale report")?;
            }
        }
        for record in &records {
            Self::write_report(&tx, record)?;
        }
        tx.commit().context("Failed to commit report cache")?;

        log::debug!("Saved {} cached reports to DuckDB", records.len());
        Ok(())
    }

    fn lookup(&self, period: Period) -> Result<Option<MonthlyReport>> {
        let conn = self.conn()?;
        let record = conn
            .query_row(
                &format!("SELECT {REPORT_COLUMNS} FROM reports WHERE year = ? AND month = ?"),
                params![period.year, (period.month as i32)],
                Self::read_report,
            )
            .optional()
            .context("Failed to look up report")?;

        record.map(MonthlyReport::try_from).transpose()
    }

    fn upsert(&self, report: MonthlyReport) -> Result<()> {
        let record = ReportRecord::try_from(&report)?;
        let conn = self.conn()?;
        Self::write_report(&conn, &record)

    }
}

impl JournalStorage for DuckDbStorage {
    /// Bring the schema up to date. Each migration and its bookkeeping row
    /// commit together.
    fn initialize(&self) -> Result<()> {
        let mut conn = self.conn()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS migrations (
                version INTEGER PRIMARY KEY,
                name VARCHAR NOT NULL,
                applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );",
        )
        .context("Failed to create migrations table")?;

        let current = schema_version(&conn)?.unwrap_or(0);
        for &(version, name, sql) in MIGRATIONS.iter().filter(|(v, _, _)| *v > current) {
            let tx = conn
                .transaction()
                .with_context(|| format!("Failed to begin migration {name}"))?;
            tx.execute_batch(sql)
                .with_context(|| format!("Failed to apply migration {name}"))?;
            tx.execute(
                "INSERT INTO migrations (version, name) VALUES (?, ?)",
                params![version, name],
            )
            .with_context(|| format!("Failed to record migration {name}"))?;
            tx.commit()
                .with_context(|| format!("Failed to commit migration {name}"))?;
            log::info!("Applied migration {name}");
        }

        Ok(())
    }
}

/// Highest applied migration, if any.
fn schema_version(conn: &Connection) -> Result<Option<i32>> {
    conn.query_row("SELECT MAX(version) FROM migrations", [], |row| {
        row.get::<_, Option<i32>>(0)
    })
    .context("Failed to read schema version")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{MoodCounts, Summary};
    use crate::infrastructure::test_utils::test_harness::TestDirStorage;

    fn entry(day: u32, mood: Mood, text: &str) -> Entry {
        Entry::new(NaiveDate::from_ymd_opt(2026, 5, day).unwrap(), mood, text).unwrap()
    }

    fn report(month: u32, summary: &str) -> MonthlyReport {
        MonthlyReport {
            period: Period::new(2026, month).unwrap(),
            total_entries: 3,
            dominant_mood: Some(Mood::Angry),
            mood_counts: MoodCounts {
                happy: 1,
                sad: 0,
                angry: 2,
            },
            summary: Summary::Generated(summary.to_string()),
        }
    }

    fn version(storage: &DuckDbStorage) -> Option<i32> {
        schema_version(&storage.conn().unwrap()).unwrap()
    }

    fn report_rows(storage: &DuckDbStorage) -> i64 {
        storage
            .conn()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM reports", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn migrations_apply_once() {
        let storage = DuckDbStorage::in_memory().unwrap();
        assert_eq!(version(&storage), Some(2));

        storage.initialize().unwrap();
        assert_eq!(version(&storage), Some(2));
        let recorded: i64 = storage
            .conn()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(recorded, 2);
    }

    #[test]
    fn reports_table_rejects_a_second_row_for_a_period() {
        let storage = DuckDbStorage::in_memory().unwrap();
        let insert = format!(
            "INSERT INTO reports ({REPORT_COLUMNS}) VALUES (1, 2025, 2, 'Happy', 2, 0, 0, 'ok')"
        );
        let conn = storage.conn().unwrap();
        conn.execute(&insert, []).unwrap();

        assert!(conn.execute(&insert, []).is_err());
        drop(conn);
        assert_eq!(report_rows(&storage), 1);
    }

    #[test]
    fn saving_an_overlapping_book_keeps_one_row_per_period() {
        let storage = DuckDbStorage::in_memory().unwrap();
        let first: ReportBook = [report(1, "jan"), report(2, "feb")].into_iter().collect();
        storage.save_reports(&first).unwrap();

        let second: ReportBook = [report(2, "feb again"), report(3, "mar")]
            .into_iter()
            .collect();
        storage.save_reports(&second).unwrap();

        assert_eq!(storage.load_reports().unwrap(), second);
        assert_eq!(report_rows(&storage), 2);
    }

    #[test]
    fn entries_come_back_in_insertion_order() {
        let storage = DuckDbStorage::in_memory().unwrap();
        assert!(storage.load_all().unwrap().is_empty());

        let later = entry(20, Mood::Happy, "later day, inserted first");
        let earlier = entry(2, Mood::Sad, "earlier day\nsecond line");
        storage.append(&later).unwrap();
        storage.append(&earlier).unwrap();

        assert_eq!(storage.load_all().unwrap(), vec![later, earlier]);
    }

    #[test]
    fn report_lookup_and_upsert() {
        let storage = DuckDbStorage::in_memory().unwrap();
        let period = Period::new(2026, 4).unwrap();
        assert!(storage.lookup(period).unwrap().is_none());

        storage.upsert(report(4, "first")).unwrap();
        storage.upsert(report(4, "second")).unwrap();

        let found = storage.lookup(period).unwrap().unwrap();
        assert_eq!(found.summary.text(), "second");
        assert_eq!(storage.load_reports().unwrap().len(), 1);
    }

    #[test]
    fn save_reports_replaces_whole_cache() {
        let storage = DuckDbStorage::in_memory().unwrap();
        storage.upsert(report(1, "stale")).unwrap();

        let book: ReportBook = [report(2, "feb"), report(3, "mar")].into_iter().collect();
        storage.save_reports(&book).unwrap();

        assert_eq!(storage.load_reports().unwrap(), book);
    }

    #[test]
    fn data_survives_reopening_the_file() {
        let harness = TestDirStorage::new();
        {
            let storage = harness.duckdb();
            storage.append(&entry(1, Mood::Happy, "persisted")).unwrap();
            storage.upsert(report(1, "kept")).unwrap();
        }

        let reopened = harness.duckdb();
        assert_eq!(reopened.load_all().unwrap().len(), 1);
        assert_eq!(reopened.load_reports().unwrap().len(), 1);
    }
}
