use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use crate::config::GatewayConfig;

/// One failed model invocation attempt. Retryable variants are recovered by
/// the transport-level loop here and by the integrator's per-row budget;
/// auth and request errors fail immediately.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("model api error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("malformed completion response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl ClientError {
    fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Api { status, .. } => *status == 429 || *status >= 500,
            ClientError::Malformed(_) => false,
        }
    }
}

/// A hosted chat-completion model. Implementors encapsulate transport and
/// vendor details; consumers stay decoupled from any particular provider.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends one rendered prompt and returns the assistant's text.
    async fn complete(&self, prompt: &str) -> Result<String, ClientError>;
}

/// Azure OpenAI chat-completions adapter.
pub struct AzureOpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    deployment: String,
    api_version: String,
    api_key: String,
    temperature: f32,
    max_retries: usize,
}

impl AzureOpenAiClient {
    pub fn new(config: &GatewayConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(AzureOpenAiClient {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            deployment: config.deployment.clone(),
            api_version: config.api_version.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
            max_retries: config.max_retries,
        })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.endpoint, self.deployment
        )
    }

    async fn attempt(&self, prompt: &str) -> Result<String, ClientError> {
        let body = json!({
            "messages": [{"role": "user", "content": prompt}],
            "temperature": self.temperature,
        });
        let response = self
            .http
            .post(self.completions_url())
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        let payload: serde_json::Value = response.json().await?;
        payload
            .pointer("/choices/0/message/content")
            .and_then(|content| content.as_str())
            .map(str::to_owned)
            .ok_or_else(|| ClientError::Malformed(payload.to_string()))
    }
}

#[async_trait]
impl CompletionClient for AzureOpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, ClientError> {
        let mut attempt = 0;
        loop {
            match self.attempt(prompt).await {
                Ok(completion) => return Ok(completion),
                Err(err) if attempt < self.max_retries && err.is_retryable() => {
                    attempt += 1;
                    log::warn!(
                        "transport retry {}/{}: {}",
                        attempt,
                        self.max_retries,
                        err
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }
}
