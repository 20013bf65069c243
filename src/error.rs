use thiserror::Error;

/// Errors surfaced by journal operations.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("entry text must not be empty")]
    EmptyText,

    /// Storage read/write failure. Fatal for the operation that hit it.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl JournalError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyText)
    }
}

/// Failure of the external summarizer. Always recovered per period.
#[derive(Debug, Error)]
pub enum SummarizationError {
    #[error("no summarizer API token configured")]
    MissingToken,

    #[error("summarizer timed out after {0}s")]
    Timeout(u64),

    #[error("summarizer returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("unusable summarizer response: {0}")]
    Malformed(String),

    #[error("summarizer request failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
#[error("unknown mood '{0}' (expected happy, sad or angry)")]
pub struct UnknownMood(pub String);
