use crate::entities::Entry;
use crate::infrastructure::{WriteContext, WriteHook};
use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const WRITE_LOG_FILE: &str = "write_log.txt";

/// Plugin that appends one audit line per recorded thought
pub struct SimpleLoggerHook {
    log_path: PathBuf,
}

impl SimpleLoggerHook {
    pub fn new(journal_dir: &Path) -> Self {
        Self {
            log_path: journal_dir.join(WRITE_LOG_FILE),
        }
    }
}

impl WriteHook for SimpleLoggerHook {
    fn on_entry_written(&self, context: &WriteContext, entry: &Entry) -> Result<()> {
        if let Some(parent) = self.log_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open {}", self.log_path.display()))?;

        writeln!(
            file,
            "[{}] {} thought recorded for {} via {} - {} characters",
            context.written_at.format("%Y-%m-%d %H:%M:%S UTC"),
            entry.mood,
            entry.date,
            context.backend,
            entry.text.chars().count()
        )?;

        Ok(())
    }

    fn name(&self) -> &str {
        "Simple Logger"
    }
}
