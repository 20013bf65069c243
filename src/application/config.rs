use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SUMMARY_ENDPOINT: &str = "https://router.huggingface.co/v1/chat/completions";
pub const DEFAULT_SUMMARY_MODEL: &str = "openai/gpt-oss-120b";
pub const DEFAULT_SUMMARY_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Files,
    DuckDb,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "files" | "file" | "json" => Ok(Backend::Files),
            "duckdb" | "db" => Ok(Backend::DuckDb),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub journal_dir: PathBuf,
    pub backend: Backend,
    pub summary_endpoint: String,
    pub summary_model: String,
    pub summary_token: Option<String>,
    pub summary_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; unset or unusable values fall
    /// back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let journal_dir = lookup("JOURNAL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::data_local_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("thought-tracker")
            });

        let backend = lookup("JOURNAL_BACKEND")
            .and_then(|raw| {
                raw.parse::<Backend>()
                    .inspect_err(|e| log::warn!("{e}, using files"))
                    .ok()
            })
            .unwrap_or(Backend::Files);

        let summary_timeout = lookup("SUMMARY_TIMEOUT_SECS")
            .and_then(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .or_else(|| {
                        log::warn!(
                            "Invalid SUMMARY_TIMEOUT_SECS '{raw}', using {DEFAULT_SUMMARY_TIMEOUT_SECS}"
                        );
                        None
                    })
            })
            .unwrap_or(DEFAULT_SUMMARY_TIMEOUT_SECS);

        Self {
            journal_dir,
            backend,
            summary_endpoint: lookup("SUMMARY_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_SUMMARY_ENDPOINT.to_string()),
            summary_model: lookup("SUMMARY_MODEL")
                .unwrap_or_else(|| DEFAULT_SUMMARY_MODEL.to_string()),
            summary_token: lookup("HF_TOKEN").filter(|token| !token.trim().is_empty()),
            summary_timeout: Duration::from_secs(summary_timeout),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.journal_dir.join("journal.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_with(&[("JOURNAL_DIR", "/tmp/journal")]);

        assert_eq!(config.journal_dir, PathBuf::from("/tmp/journal"));
        assert_eq!(config.backend, Backend::Files);
        assert_eq!(config.summary_model, DEFAULT_SUMMARY_MODEL);
        assert_eq!(config.summary_endpoint, DEFAULT_SUMMARY_ENDPOINT);
        assert_eq!(config.summary_timeout, Duration::from_secs(30));
        assert!(config.summary_token.is_none());
        assert_eq!(config.db_path(), PathBuf::from("/tmp/journal/journal.db"));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = config_with(&[
            ("JOURNAL_DIR", "/data"),
            ("JOURNAL_BACKEND", "DuckDB"),
            ("HF_TOKEN", "hf_secret"),
            ("SUMMARY_MODEL", "meta-llama/Llama-3.1-8B-Instruct"),
            ("SUMMARY_TIMEOUT_SECS", "5"),
        ]);

        assert_eq!(config.backend, Backend::DuckDb);
        assert_eq!(config.summary_token.as_deref(), Some("hf_secret"));
        assert_eq!(config.summary_model, "meta-llama/Llama-3.1-8B-Instruct");
        assert_eq!(config.summary_timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_values_fall_back() {
        let config = config_with(&[
            ("JOURNAL_BACKEND", "postgres"),
            ("SUMMARY_TIMEOUT_SECS", "soon"),
            ("HF_TOKEN", "  "),
        ]);

        assert_eq!(config.backend, Backend::Files);
        assert_eq!(config.summary_timeout, Duration::from_secs(30));
        assert!(config.summary_token.is_none());

        let zero = config_with(&[("SUMMARY_TIMEOUT_SECS", "0")]);
        assert_eq!(zero.summary_timeout, Duration::from_secs(30));
    }
}
