use crate::entities::{Entry, MonthlyReport, ReportBook};
use crate::infrastructure::records::ReportRecord;
use crate::infrastructure::{EntryRepository, JournalStorage, ReportCache};
use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const ENTRIES_FILE: &str = "thoughts.jsonl";
pub const REPORTS_FILE: &str = "reports.json";

/// Plain-file backend: entries as JSON lines, reports as one JSON array.
pub struct FileSystemStorage {
    journal_dir: PathBuf,
}

impl FileSystemStorage {
    pub fn new(journal_dir: PathBuf) -> Self {
        Self { journal_dir }
    }

    pub fn entries_path(&self) -> PathBuf {
        self.journal_dir.join(ENTRIES_FILE)
    }

    pub fn reports_path(&self) -> PathBuf {
        self.journal_dir.join(REPORTS_FILE)
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.journal_dir).with_context(|| {
            format!(
                "Failed to create journal directory {}",
                self.journal_dir.display()
            )
        })
    }
}

/// Cut an unterminated last line left by an interrupted append, so the next
/// record starts on a line of its own.
fn drop_torn_tail(file: &mut File, path: &Path) -> Result<()> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(());
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    if last[0] == b'\n' {
        return Ok(());
    }

    let mut content = Vec::with_capacity(len as usize);
    file.seek(SeekFrom::Start(0))?;
    file.read_to_end(&mut content)?;
    let keep = content
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);
    log::warn!(
        "Dropping {} bytes of an incomplete entry at the end of {}",
        content.len() - keep,
        path.display()
    );
    file.set_len(keep as u64)
        .with_context(|| format!("Failed to truncate {}", path.display()))?;
    Ok(())
}

/// Read a file, treating a missing one as absent rather than an error.
fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

impl EntryRepository for FileSystemStorage {
    fn append(&self, entry: &Entry) -> Result<()> {
        self.ensure_dir()?;
        let path = self.entries_path();

        let mut line = serde_json::to_string(entry).context("Failed to serialize entry")?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        drop_torn_tail(&mut file, &path)
            .with_context(|| format!("Failed to check the tail of {}", path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("Failed to append to {}", path.display()))?;
        file.sync_all()
            .with_context(|| format!("Failed to sync {}", path.display()))?;

        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Entry>> {
        let path = self.entries_path();
        let Some(content) = read_optional(&path)? else {
            return Ok(Vec::new());
        };

        let torn_tail = !content.is_empty() && !content.ends_with('\n');
        let lines: Vec<(usize, &str)> = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .collect();

        let mut entries: Vec<Entry> = Vec::with_capacity(lines.len());
        for (pos, &(idx, line)) in lines.iter().enumerate() {
            match serde_json::from_str(line) {
                Ok(entry) => entries.push(entry),
                // An unterminated final line is an append that never finished.
                Err(e) if torn_tail && pos + 1 == lines.len() => {
                    log::warn!(
                        "Skipping incomplete entry on line {} of {}: {e}",
                        idx + 1,
                        path.display()
                    );
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Malformed entry on line {} of {}", idx + 1, path.display())
                    });
                }
            }
        }

        Ok(entries)
    }

    fn backend_info(&self) -> &str {
        "JSON file storage"
    }
}

impl ReportCache for FileSystemStorage {
    fn load_reports(&self) -> Result<ReportBook> {
        let path = self.reports_path();
        let Some(content) = read_optional(&path)? else {
            return Ok(ReportBook::new());
        };

        let records: Vec<ReportRecord> = serde_json::from_str(&content)
            .with_context(|| format!("Malformed report cache {}", path.display()))?;

        records
            .into_iter()
            .map(MonthlyReport::try_from)
            .collect::<Result<ReportBook>>()
    }

    fn save_reports(&self, book: &ReportBook) -> Result<()> {
        self.ensure_dir()?;
        let path = self.reports_path();

        let records = book
            .iter()
            .map(ReportRecord::try_from)
            .collect::<Result<Vec<_>>>()?;

        // Written beside the target so the final rename stays on one filesystem.
        let tmp = NamedTempFile::new_in(&self.journal_dir)
            .context("Failed to create temporary report file")?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, &records)
                .context("Failed to serialize report cache")?;
            writer.flush().context("Failed to flush report cache")?;
        }
        tmp.as_file()
            .sync_all()
            .context("Failed to sync report cache")?;
        tmp.persist(&path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        log::debug!("Saved {} cached reports to {}", book.len(), path.display());
        Ok(())
    }
}

impl JournalStorage for FileSystemStorage {
    fn initialize(&self) -> Result<()> {
        self.ensure_dir()
    }
}
