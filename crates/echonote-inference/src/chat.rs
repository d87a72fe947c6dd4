//! OpenAI-compatible chat completions backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use echonote_core::{defaults, Error, GenerationBackend, Result};

/// Chat completions client against a hosted OpenAI-compatible API.
///
/// The transform feature uses a fixed model and fixed sampling parameters;
/// there is no model selection or per-request tuning.
pub struct ChatCompletionsBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsBackend {
    /// Create a new backend with default model and sampling parameters.
    pub fn new(base_url: String, api_key: String) -> Self {
        Self::with_model(base_url, api_key, defaults::GENERATION_MODEL.to_string())
    }

    /// Create a new backend with a custom model.
    pub fn with_model(base_url: String, api_key: String, model: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(defaults::GENERATION_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        info!(
            subsystem = "inference",
            component = "chat",
            model = %model,
            "Initializing generation backend"
        );

        Self {
            client,
            base_url,
            api_key,
            model,
            temperature: defaults::GENERATION_TEMPERATURE,
            max_tokens: defaults::GENERATION_MAX_TOKENS,
        }
    }

    /// Create from environment variables.
    ///
    /// Fails with `Error::Config` when the API key is missing.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(defaults::ENV_GENERATION_BASE_URL)
            .unwrap_or_else(|_| defaults::GENERATION_BASE_URL.to_string());
        let api_key = std::env::var(defaults::ENV_GENERATION_API_KEY).map_err(|_| {
            Error::Config(format!("{} is not set", defaults::ENV_GENERATION_API_KEY))
        })?;
        let model = std::env::var(defaults::ENV_GENERATION_MODEL)
            .unwrap_or_else(|_| defaults::GENERATION_MODEL.to_string());

        Ok(Self::with_model(base_url, api_key, model))
    }
}

#[async_trait]
impl GenerationBackend for ChatCompletionsBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();
        let url = format!("{}/v1/chat/completions", self.base_url);

        debug!(
            subsystem = "inference",
            component = "chat",
            op = "generate",
            model = %self.model,
            prompt_len = prompt.len(),
            "Sending generation request"
        );

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("generation request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!(
                "generation API returned {}: {}",
                status, body
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("failed to parse completion: {}", e)))?;

        let text = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Inference("no content in completion".to_string()))?;

        info!(
            subsystem = "inference",
            component = "chat",
            op = "generate",
            model = %self.model,
            prompt_len = prompt.len(),
            response_len = text.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Generation complete"
        );

        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_uses_fixed_sampling_parameters() {
        let backend = ChatCompletionsBackend::new("http://localhost".into(), "key".into());
        assert_eq!(backend.model_name(), defaults::GENERATION_MODEL);
        assert_eq!(backend.temperature, defaults::GENERATION_TEMPERATURE);
        assert_eq!(backend.max_tokens, defaults::GENERATION_MAX_TOKENS);
    }

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatRequest {
            model: "llama-3.3-70b-versatile",
            messages: vec![ChatMessage {
                role: "user",
                content: "Rewrite this.",
            }],
            temperature: 0.7,
            max_tokens: 1000,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama-3.3-70b-versatile");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["temperature"], 0.7);
        assert_eq!(json["max_tokens"], 1000);
    }

    #[test]
    fn test_chat_response_deserialization() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"Done."}}]}"#;
        let resp: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.choices[0].message.content.as_deref(), Some("Done."));
    }

    #[test]
    fn test_chat_response_deserialization_empty_choices() {
        let resp: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(resp.choices.is_empty());

        let resp: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.choices.is_empty());
    }
}
