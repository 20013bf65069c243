/// Test utilities for storage and pipeline tests
///
/// Provides temp-dir-backed storages that clean themselves up, plus
/// deterministic stand-ins for the summarizer and a recording write hook.
///
/// ## Usage Examples
///
/// ```rust,ignore
/// use crate::infrastructure::test_utils::test_harness::*;
///
/// #[test]
/// fn my_test() {
///     let harness = TestDirStorage::new();
///     let storage = harness.files();
///     // Directory is removed when `harness` is dropped
/// }
/// ```
#[cfg(test)]
pub mod test_harness {
    use crate::entities::{Entry, Mood};
    use crate::error::SummarizationError;
    use crate::infrastructure::{
        DuckDbStorage, FileSystemStorage, Summarizer, WriteContext, WriteHook,
    };
    use anyhow::Result;
    use chrono::NaiveDate;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Fresh journal directory per test
    pub struct TestDirStorage {
        temp_dir: TempDir,
    }

    impl TestDirStorage {
        pub fn new() -> Self {
            Self {
                temp_dir: TempDir::new().expect("Failed to create temp directory"),
            }
        }

        pub fn path(&self) -> &Path {
            self.temp_dir.path()
        }

        pub fn files(&self) -> FileSystemStorage {
            FileSystemStorage::new(self.temp_dir.path().to_path_buf())
        }

        pub fn duckdb(&self) -> DuckDbStorage {
            DuckDbStorage::new(self.temp_dir.path().join("test.db"))
                .expect("Failed to initialize test DuckDB storage")
        }
    }

    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    pub fn entry(on: NaiveDate, mood: Mood, text: &str) -> Entry {
        Entry::new(on, mood, text).expect("valid test entry")
    }

    /// Deterministic summarizer: echoes line count and first line, counts calls.
    #[derive(Default)]
    pub struct EchoSummarizer {
        calls: Cell<usize>,
        inputs: RefCell<Vec<String>>,
    }

    impl EchoSummarizer {
        pub fn calls(&self) -> usize {
            self.calls.get()
        }

        pub fn inputs(&self) -> Vec<String> {
            self.inputs.borrow().clone()
        }
    }

    impl Summarizer for EchoSummarizer {
        fn summarize(&self, text: &str) -> Result<String, SummarizationError> {
            self.calls.set(self.calls.get() + 1);
            self.inputs.borrow_mut().push(text.to_string());
            let first = text.lines().next().unwrap_or_default();
            Ok(format!("{} thoughts, starting with '{}'", text.lines().count(), first))
        }
    }

    /// Always fails, as an unreachable service would.
    #[derive(Default)]
    pub struct FailingSummarizer {
        calls: Cell<usize>,
    }

    impl FailingSummarizer {
        pub fn calls(&self) -> usize {
            self.calls.get()
        }
    }

    impl Summarizer for FailingSummarizer {
        fn summarize(&self, _text: &str) -> Result<String, SummarizationError> {
            self.calls.set(self.calls.get() + 1);
            Err(SummarizationError::Timeout(30))
        }
    }

    /// Replays queued outcomes in order; `None` stands for a failure.
    pub struct ScriptedSummarizer {
        outcomes: RefCell<VecDeque<Option<String>>>,
    }

    impl ScriptedSummarizer {
        pub fn new(outcomes: impl IntoIterator<Item = Option<&'static str>>) -> Self {
            Self {
                outcomes: RefCell::new(
                    outcomes
                        .into_iter()
                        .map(|o| o.map(str::to_string))
                        .collect(),
                ),
            }
        }
    }

    impl Summarizer for ScriptedSummarizer {
        fn summarize(&self, _text: &str) -> Result<String, SummarizationError> {
            match self.outcomes.borrow_mut().pop_front() {
                Some(Some(text)) => Ok(text),
                Some(None) => Err(SummarizationError::Upstream {
                    status: 503,
                    body: "model loading".to_string(),
                }),
                None => Err(SummarizationError::Malformed("script exhausted".to_string())),
            }
        }
    }

    /// Write hook that remembers the text of every entry it sees
    #[derive(Default)]
    pub struct RecordingHook {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingHook {
        pub fn seen(&self) -> Arc<Mutex<Vec<String>>> {
            self.seen.clone()
        }
    }

    impl WriteHook for RecordingHook {
        fn on_entry_written(&self, _context: &WriteContext, entry: &Entry) -> Result<()> {
            self.seen
                .lock()
                .expect("recording hook lock")
                .push(entry.text.clone());
            Ok(())
        }

        fn name(&self) -> &str {
            "Recording"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_harness::*;
    use crate::entities::Mood;
    use crate::infrastructure::{EntryRepository, Summarizer};

    #[test]
    fn harness_directories_are_isolated() {
        let first = TestDirStorage::new();
        let second = TestDirStorage::new();

        first
            .files()
            .append(&entry(date(2026, 1, 1), Mood::Happy, "only here"))
            .unwrap();

        assert_eq!(first.files().load_all().unwrap().len(), 1);
        assert!(second.files().load_all().unwrap().is_empty());
    }

    #[test]
    fn scripted_summarizer_replays_in_order() {
        let summarizer = ScriptedSummarizer::new([Some("ok"), None]);
        assert_eq!(summarizer.summarize("x").unwrap(), "ok");
        assert!(summarizer.summarize("x").is_err());
        assert!(summarizer.summarize("x").is_err());
    }
}
