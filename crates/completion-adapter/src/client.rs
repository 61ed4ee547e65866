//! Messages API client and the [`BatchAdapter`] built on it.

use std::time::Duration;

use async_trait::async_trait;
use quota_generator::{AdapterError, BatchAdapter, BatchRequest};
use reqwest::Client;
use seed_core::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::error::CompletionError;
use crate::extract::extract_json_array;
use crate::prompt::PromptTemplate;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const DEFAULT_MAX_TOKENS: u32 = 4000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);
pub const API_VERSION: &str = "2023-06-01";

/// Connection and sampling settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl CompletionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Generates candidate records by prompting a hosted model.
pub struct AnthropicAdapter {
    client: Client,
    config: CompletionConfig,
    prompt: PromptTemplate,
}

impl AnthropicAdapter {
    pub fn new(config: CompletionConfig, prompt: PromptTemplate) -> Result<Self, CompletionError> {
        if config.api_key.trim().is_empty() {
            return Err(CompletionError::MissingApiKey);
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            prompt,
        })
    }

    /// Send one prompt and return the text of the first content block.
    pub async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(self.config.messages_url())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let payload: Value = response.json().await.unwrap_or(Value::Null);
            let kind = payload["error"]["type"]
                .as_str()
                .unwrap_or("api_error")
                .to_string();
            let message = payload["error"]["message"]
                .as_str()
                .map(String::from)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            error!("Completion request failed: {} ({})", status, kind);
            return Err(CompletionError::Api {
                status: status.as_u16(),
                kind,
                message,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Unparseable(format!("invalid response body: {e}")))?;
        parsed
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| CompletionError::Unparseable("no text content in response".into()))
    }
}

#[async_trait]
impl BatchAdapter for AnthropicAdapter {
    async fn generate(&self, request: &BatchRequest) -> Result<Vec<Record>, AdapterError> {
        let prompt = self.prompt.render(request);
        debug!(
            "Requesting batch {} (attempt {}, size {})",
            request.batch_number, request.attempt, request.batch_size
        );
        let text = self.complete(&prompt).await?;
        Ok(extract_json_array(&text)?)
    }
}
