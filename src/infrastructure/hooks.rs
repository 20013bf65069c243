use crate::entities::Entry;
use anyhow::Result;
use chrono::{DateTime, Utc};

/// Context provided to write hooks
#[derive(Debug, Clone)]
pub struct WriteContext {
    /// Storage backend that accepted the entry
    pub backend: String,
    pub written_at: DateTime<Utc>,
}

/// Trait for plugins that respond to entry write events
pub trait WriteHook: Send + Sync {
    /// Called after an entry has been durably appended
    fn on_entry_written(&self, context: &WriteContext, entry: &Entry) -> Result<()>;

    /// Human-readable name for this hook
    fn name(&self) -> &str;
}

/// Registry for managing write hooks
#[derive(Default)]
pub struct HookRegistry {
    hooks: Vec<Box<dyn WriteHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Register a new write hook
    pub fn register<H>(&mut self, hook: H)
    where
        H: WriteHook + 'static,
    {
        self.hooks.push(Box::new(hook));
    }

    /// Run every hook. A failing hook is logged and the rest still run.
    pub fn execute_write_hooks(&self, context: &WriteContext, entry: &Entry) {
        for hook in &self.hooks {
            if let Err(e) = hook.on_entry_written(context, entry) {
                log::warn!("Hook '{}' failed: {:#}", hook.name(), e);
            }
        }
    }

    pub fn list_hooks(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }
}
