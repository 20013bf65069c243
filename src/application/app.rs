use crate::application::{Backend, Config};
use crate::entities::{Clock, Entry, Journal, Mood, SystemClock};
use crate::error::JournalError;
use crate::infrastructure::{
    ChatCompletionSummarizer, DuckDbStorage, EntryRepository, FileSystemStorage, HookRegistry,
    JournalStorage, SimpleLoggerHook, Summarizer,
};
use crate::reports::{PeriodReport, generate_reports};
use anyhow::{Context, Result};
use std::sync::Arc;

pub struct JournalApp {
    journal: Journal,
    storage: Arc<dyn JournalStorage>,
    summarizer: Box<dyn Summarizer>,
    clock: Arc<dyn Clock>,
}

impl JournalApp {
    pub fn new() -> Result<Self> {
        Self::with_default_plugins(Config::from_env())
    }

    pub fn with_default_plugins(config: Config) -> Result<Self> {
        let mut hooks = HookRegistry::new();
        hooks.register(SimpleLoggerHook::new(&config.journal_dir));
        Self::from_config(config, hooks)
    }

    pub fn without_plugins(config: Config) -> Result<Self> {
        Self::from_config(config, HookRegistry::new())
    }

    fn from_config(config: Config, hooks: HookRegistry) -> Result<Self> {
        let storage = open_storage(&config)?;
        log::debug!(
            "Opened {} with write hooks {:?}",
            storage.backend_info(),
            hooks.list_hooks()
        );
        let summarizer = ChatCompletionSummarizer::new(
            config.summary_endpoint.clone(),
            config.summary_model.clone(),
            config.summary_token.clone(),
            config.summary_timeout,
        )
        .context("Failed to build summarizer client")?;

        if config.summary_token.is_none() {
            log::warn!("HF_TOKEN not set - monthly summaries will be unavailable");
        }

        Ok(Self::from_parts(
            storage,
            Box::new(summarizer),
            Arc::new(SystemClock),
            hooks,
        ))
    }

    /// Assemble an app from explicit collaborators.
    pub fn from_parts(
        storage: Arc<dyn JournalStorage>,
        summarizer: Box<dyn Summarizer>,
        clock: Arc<dyn Clock>,
        hooks: HookRegistry,
    ) -> Self {
        let journal = Journal::with_hooks(Box::new(storage.clone()), clock.clone(), hooks);
        Self {
            journal,
            storage,
            summarizer,
            clock,
        }
    }

    pub fn record_thought(&self, mood: Mood, text: &str) -> Result<Entry, JournalError> {
        self.journal.append(mood, text)
    }

    pub fn history(&self, limit: Option<usize>) -> Result<Vec<Entry>> {
        self.journal.history(limit)
    }

    pub fn monthly_reports(&self) -> Result<Vec<PeriodReport>> {
        generate_reports(
            &*self.storage,
            &*self.storage,
            &*self.summarizer,
            &*self.clock,
        )
    }
}

pub fn open_storage(config: &Config) -> Result<Arc<dyn JournalStorage>> {
    let storage: Arc<dyn JournalStorage> = match config.backend {
        Backend::Files => Arc::new(FileSystemStorage::new(config.journal_dir.clone())),
        Backend::DuckDb => {
            std::fs::create_dir_all(&config.journal_dir).with_context(|| {
                format!("Failed to create {}", config.journal_dir.display())
            })?;
            Arc::new(DuckDbStorage::new(config.db_path())?)
        }
    };
    storage.initialize()?;
    log::debug!(
        "Opened {} in {}",
        storage.backend_info(),
        config.journal_dir.display()
    );
    Ok(storage)
}
