//! HTTP JSON sink.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use seed_core::Record;
use seed_populate::{Sink, SinkError, SinkOutcome};
use serde_json::Value;

pub const DEFAULT_RESPONSE_ID_FIELD: &str = "id";

/// POSTs each record as a JSON object to a fixed endpoint.
///
/// 401 and 403 are reported as [`SinkError::Unauthorized`], any other
/// non-success status as [`SinkError::Rejected`]. The identifier the target
/// assigned is read from `response_id_field` of a JSON object response.
pub struct HttpJsonSink {
    client: Client,
    endpoint: String,
    bearer_token: Option<String>,
    response_id_field: String,
}

impl HttpJsonSink {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            bearer_token: None,
            response_id_field: DEFAULT_RESPONSE_ID_FIELD.to_string(),
        })
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_response_id_field(mut self, field: impl Into<String>) -> Self {
        self.response_id_field = field.into();
        self
    }

    fn extract_id(&self, body: &Value) -> Option<String> {
        match body.get(&self.response_id_field)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[async_trait]
impl Sink for HttpJsonSink {
    async fn write(&self, record: &Record) -> Result<SinkOutcome, SinkError> {
        let mut request = self.client.post(&self.endpoint).json(record);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SinkError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SinkError::Transport(e.to_string()))?;

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(SinkError::Unauthorized(format!("HTTP {status}")));
        }
        if !status.is_success() {
            let snippet: String = text.chars().take(200).collect();
            return Err(SinkError::Rejected(format!("HTTP {status}: {snippet}")));
        }

        let external_id = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|body| self.extract_id(&body));
        Ok(SinkOutcome { external_id })
    }
}
