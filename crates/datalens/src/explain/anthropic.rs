//! Anthropic Claude API explanation provider.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;

use crate::engine::Artifact;
use crate::error::{DatalensError, Result};
use crate::guard::GuardBlock;

use super::prompts;
use super::provider::{ExplainConfig, ExplanationProvider};

/// Anthropic API endpoint.
const API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version.
const API_VERSION: &str = "2023-06-01";

/// Explanation provider backed by the Claude Messages API.
pub struct AnthropicExplainer {
    client: Client,
    api_key: String,
    config: ExplainConfig,
}

impl AnthropicExplainer {
    /// Create a provider with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, ExplainConfig::default())
    }

    /// Create a provider with custom configuration.
    pub fn with_config(api_key: impl Into<String>, config: ExplainConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| DatalensError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
        })
    }

    /// Create from the `ANTHROPIC_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            DatalensError::Config("ANTHROPIC_API_KEY environment variable not set".to_string())
        })?;
        Self::new(api_key)
    }

    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| DatalensError::Config(format!("Invalid API key: {e}")))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }

    fn send_message(&self, user_prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "system": prompts::system_prompt(),
            "messages": [
                {
                    "role": "user",
                    "content": user_prompt
                }
            ]
        });

        let response = self
            .client
            .post(API_URL)
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .map_err(|e| DatalensError::Config(format!("API request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(DatalensError::Config(format!(
                "API error ({status}): {error_text}"
            )));
        }

        let api_response: ApiResponse = response
            .json()
            .map_err(|e| DatalensError::Config(format!("Failed to parse API response: {e}")))?;

        api_response
            .content
            .into_iter()
            .find_map(|block| (block.content_type == "text").then_some(block.text))
            .ok_or_else(|| {
                DatalensError::Config("API response contained no text content".to_string())
            })
    }
}

impl ExplanationProvider for AnthropicExplainer {
    fn explain_artifact(&self, question: &str, artifact: &Artifact) -> Result<String> {
        if !self.config.explain_artifacts {
            return Ok(String::new());
        }
        self.send_message(&prompts::artifact_prompt(question, artifact))
    }

    fn explain_block(&self, question: &str, block: &GuardBlock) -> Result<String> {
        if !self.config.explain_blocks {
            return Ok(String::new());
        }
        self.send_message(&prompts::block_prompt(question, block))
    }

    fn config(&self) -> &ExplainConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

/// Response shape from the Messages API.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}
