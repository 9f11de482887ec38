//! Thin client for the language-model API backing mood insights.

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const API_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("missing api key: ANTHROPIC_API_KEY not set")]
    MissingApiKey,
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("rate limited")]
    RateLimited,
    #[error("invalid api key")]
    InvalidApiKey,
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("bad response: {0}")]
    BadResponse(String),
}

impl LlmError {
    fn should_retry(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout | Self::RateLimited => true,
            Self::Http { status, .. } => (500..=599).contains(status),
            _ => false,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    content: Vec<ContentBlock>,
}

impl CompletionResponse {
    fn into_text(self) -> Option<String> {
        self.content.into_iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
        })
    }
}

/// Client for single-turn completions against the messages endpoint.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: Client,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, model: Option<String>) -> Result<Self, LlmError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("moodlog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| LlmError::MissingApiKey)?;
        Self::new(api_key, None)
    }

    /// Send one user prompt and return the text reply. Transient failures
    /// are retried with exponential backoff.
    pub async fn ask(&self, prompt: &str, system: Option<String>) -> Result<String, LlmError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            max_tokens: 2048,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            system,
        };

        let response = (|| async { self.send(&request).await })
            .retry(
                &ExponentialBuilder::default()
                    .with_min_delay(Duration::from_secs(1))
                    .with_max_delay(Duration::from_secs(30))
                    .with_max_times(3)
                    .with_jitter(),
            )
            .when(LlmError::should_retry)
            .notify(|e, dur| {
                warn!("LLM request failed, retrying after {:.2}s: {}", dur.as_secs_f64(), e)
            })
            .await?;

        response
            .into_text()
            .ok_or_else(|| LlmError::BadResponse("no text content".to_string()))
    }

    /// Ask for a JSON reply and deserialize it, tolerating markdown fences.
    pub async fn ask_json<T: for<'de> Deserialize<'de>>(
        &self,
        prompt: &str,
        system: Option<String>,
    ) -> Result<T, LlmError> {
        let text = self.ask(prompt, system).await?;
        let json = strip_code_fences(&text);
        serde_json::from_str(json).map_err(|e| {
            LlmError::BadResponse(format!(
                "{e} (reply preview: {})",
                json.chars().take(200).collect::<String>()
            ))
        })
    }

    async fn send(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let res = self
            .http
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Transport(e.to_string())
                }
            })?;

        match res.status() {
            s if s.is_success() => res
                .json::<CompletionResponse>()
                .await
                .map_err(|e| LlmError::BadResponse(e.to_string())),
            StatusCode::UNAUTHORIZED => Err(LlmError::InvalidApiKey),
            StatusCode::TOO_MANY_REQUESTS => Err(LlmError::RateLimited),
            s => Err(LlmError::Http {
                status: s.as_u16(),
                body: res.text().await.unwrap_or_default(),
            }),
        }
    }
}

/// Models wrap JSON in ``` fences more often than not, sometimes after a
/// line of prose, so the opening fence is searched for rather than expected
/// at the start.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let rest = &trimmed[start + 3..];
    // Drop an optional language tag on the opening fence.
    let body = rest.split_once('\n').map_or(rest, |(_, b)| b);
    body.rsplit_once("```").map_or(body, |(b, _)| b).trim()
}
