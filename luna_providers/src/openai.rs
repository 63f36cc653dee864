use async_trait::async_trait;
use luna_core::{ChatMessage, LLMProvider, LLMResponse, Usage};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::info;

use crate::retry::{RetryPolicy, retry_with_backoff};

/// Gemini's OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Chat completion client for any endpoint speaking the OpenAI wire format.
#[derive(Clone)]
pub struct OpenAiCompatProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    retry: RetryPolicy,
}

impl OpenAiCompatProvider {
    /// `timeout` bounds each HTTP attempt.
    pub fn new(api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        info!(
            "Creating OpenAI-compatible chat provider (timeout {}s)",
            timeout.as_secs()
        );
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            retry: RetryPolicy::llm_default(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Helper method to send a single request
    async fn try_send(&self, request: &serde_json::Value) -> anyhow::Result<LLMResponse> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;

        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid response format: missing content"))?
            .to_string();

        let usage = response["usage"].as_object().map(|u| {
            let field = |name: &str| {
                u.get(name)
                    .and_then(serde_json::Value::as_u64)
                    .and_then(|v| u32::try_from(v).ok())
                    .unwrap_or(0)
            };
            Usage {
                prompt_tokens: field("prompt_tokens"),
                completion_tokens: field("completion_tokens"),
                total_tokens: field("total_tokens"),
            }
        });

        Ok(LLMResponse { content, usage })
    }
}

/// Client errors other than rate limiting will not get better by retrying.
fn is_transient(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<reqwest::Error>()
        .and_then(reqwest::Error::status)
        .is_none_or(|status| status.as_u16() == 429 || status.is_server_error())
}

#[async_trait]
impl LLMProvider for OpenAiCompatProvider {
    async fn chat(&self, messages: &[ChatMessage], model: &str) -> anyhow::Result<LLMResponse> {
        let request = json!({
            "model": model,
            "messages": messages,
            "temperature": self.temperature,
        });

        info!("Sending chat completion request: model={model}");

        let response = retry_with_backoff(|| self.try_send(&request), &self.retry, is_transient).await?;

        info!("Received chat completion response");
        Ok(response)
    }

    fn get_default_model(&self) -> &str {
        &self.model
    }
}
