use crate::error::SummarizationError;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const SYSTEM_PROMPT: &str = "You are a concise, helpful assistant that summarizes diary entries, \
     focusing on key themes and emotions. Do not exceed 100 words.";

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

const MAX_ERROR_BODY_CHARS: usize = 500;

/// Turns a month of diary text into a short digest.
pub trait Summarizer {
    fn summarize(&self, text: &str) -> Result<String, SummarizationError>;
}

pub fn user_prompt(text: &str) -> String {
    format!("Summarize the following personal thoughts. be concise and under 100 words:\n\n{text}")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

impl ChatRequest {
    pub fn summary(model: &str, text: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt(text),
                },
            ],
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

/// Pull the first non-blank message out of a chat-completion body.
pub fn extract_summary(body: &[u8]) -> Result<String, SummarizationError> {
    let completion: ChatCompletion = serde_json::from_slice(body)
        .map_err(|e| SummarizationError::Malformed(format!("failed to parse response: {e}")))?;

    completion
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| SummarizationError::Malformed("empty choices or blank content".to_string()))
}

/// OpenAI-compatible chat-completion client (Hugging Face router by default).
pub struct ChatCompletionSummarizer {
    client: Client,
    endpoint: String,
    model: String,
    token: Option<String>,
    timeout: Duration,
}

impl ChatCompletionSummarizer {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SummarizationError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            token,
            timeout,
        })
    }
}

impl Summarizer for ChatCompletionSummarizer {
    fn summarize(&self, text: &str) -> Result<String, SummarizationError> {
        let token = self
            .token
            .as_deref()
            .ok_or(SummarizationError::MissingToken)?;

        log::debug!("Requesting summary from {} ({})", self.endpoint, self.model);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&ChatRequest::summary(&self.model, text))
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    SummarizationError::Timeout(self.timeout.as_secs())
                } else {
                    SummarizationError::Request(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SummarizationError::Upstream {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let bytes = response.bytes().map_err(|e| {
            if e.is_timeout() {
                SummarizationError::Timeout(self.timeout.as_secs())
            } else {
                SummarizationError::Request(e)
            }
        })?;

        extract_summary(&bytes)
    }
}
