use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use procurechat_core::config::{LlmConfig, LlmProvider};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// The single operation the assistant needs from a text-generation
/// service: prompt in, completion text out. No streaming.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Chat-completions client for OpenAI and OpenAI-compatible endpoints
/// (Ollama serves the same API locally).
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    model: String,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl OpenAiClient {
    /// Build a client from config with an explicit sampling temperature.
    ///
    /// The query-translation calls want deterministic output
    /// (temperature 0), while the conversational paths use the
    /// configured chat temperature, so callers construct one client per
    /// temperature rather than threading it through every call.
    pub fn from_config(config: &LlmConfig, temperature: f32) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client for the LLM endpoint")?;

        let base_url = match config.provider {
            LlmProvider::OpenAi => config
                .base_url
                .clone()
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            LlmProvider::Ollama => config
                .base_url
                .clone()
                .context("llm.base_url is required for the ollama provider")?,
        };

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
        };

        tracing::debug!(
            event_name = "llm.complete.request",
            model = %self.model,
            prompt_length = prompt.len(),
            "sending completion request"
        );

        let mut http_request = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request);
        if let Some(api_key) = &self.api_key {
            http_request = http_request.bearer_auth(api_key.expose_secret());
        }

        let response = http_request
            .send()
            .await
            .context("failed to send completion request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("completion endpoint returned {status}: {body}");
        }

        let payload: ChatCompletionResponse = response
            .json()
            .await
            .context("failed to decode completion response")?;

        let content = payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .context("completion response contained no choices")?;

        Ok(content.trim().to_string())
    }
}
