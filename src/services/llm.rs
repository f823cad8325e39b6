//! LLM service for answer generation and query rewriting
//!
//! Integrates with the Anthropic messages API behind the [`TextGenerator`]
//! seam so the retrieval core, the rewriter, and the evaluation metrics can
//! all be driven by stub generators in tests.

use crate::config::LlmConfig;
use crate::error::{AnamnesisError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Single-operation seam for hosted language models.
///
/// Calls are issued one at a time; implementations are not expected to
/// support concurrent in-flight requests.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate free text for a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Anthropic messages API client
pub struct AnthropicGenerator {
    config: LlmConfig,
    client: reqwest::Client,
}

/// Anthropic API message format
#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: usize,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

/// Anthropic API response format
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    text: String,
}

impl AnthropicGenerator {
    /// Create a new generator.
    ///
    /// Fails when no API key is configured: without one the whole chat or
    /// evaluation session cannot run, which is the one fatal startup case.
    pub fn new(config: LlmConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(AnamnesisError::Config(config::ConfigError::Message(
                "ANTHROPIC_API_KEY not set".to_string(),
            )));
        }

        Ok(Self {
            config,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl TextGenerator for AnthropicGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Calling Anthropic API ({} char prompt)", prompt.len());

        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(AnamnesisError::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AnamnesisError::LlmApi(format!(
                "API request failed with status {}: {}",
                status, error_text
            )));
        }

        let api_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| AnamnesisError::LlmApi(format!("Failed to parse response: {}", e)))?;

        api_response
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| AnamnesisError::LlmApi("Empty response content".to_string()))
    }
}
