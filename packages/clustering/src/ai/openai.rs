//! OpenAI implementation of the Oracle trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use clustering::ai::OpenAiOracle;
//!
//! let oracle = OpenAiOracle::new("sk-...".into()).with_model("gpt-4o");
//! let clusterer = Clusterer::new(oracle);
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClusteringError, Result};
use crate::pipeline::prompts::{format_cluster_prompt, CLUSTER_SYSTEM_PROMPT};
use crate::traits::oracle::{Oracle, OracleRequest};

const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat-completions oracle.
///
/// Returns the model's message content untouched; fence stripping and
/// decoding are left to the reconciler.
pub struct OpenAiOracle {
    client: Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl OpenAiOracle {
    /// Create a new oracle with the given API key.
    pub fn new(api_key: SecretString) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Set the chat model (default: gpt-4o).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the current model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: Some(0.0),
            max_tokens: Some(4096),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| ClusteringError::Oracle(Box::new(e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClusteringError::Oracle(
                format!("OpenAI API error ({status}): {error_text}").into(),
            ));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClusteringError::Oracle(Box::new(e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ClusteringError::Oracle("No response from OpenAI".into()))
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    async fn classify(&self, request: &OracleRequest<'_, '_>) -> Result<String> {
        let prompt = format_cluster_prompt(request);
        debug!(
            model = %self.model,
            items = request.len(),
            prompt_chars = prompt.len(),
            "Calling OpenAI"
        );
        self.chat(CLUSTER_SYSTEM_PROMPT, &prompt).await
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let oracle = OpenAiOracle::new("sk-test".into())
            .with_model("gpt-4o-mini")
            .with_base_url("http://localhost:11434/v1/");

        assert_eq!(oracle.model(), "gpt-4o-mini");
        assert_eq!(oracle.base_url(), "http://localhost:11434/v1");
        assert_eq!(oracle.api_key.expose_secret(), "sk-test");
    }

    #[test]
    fn test_defaults() {
        let oracle = OpenAiOracle::new("sk-test".into());

        assert_eq!(oracle.model(), "gpt-4o");
        assert_eq!(oracle.base_url(), "https://api.openai.com/v1");
    }

    #[test]
    fn test_chat_request_shape() {
        let request = ChatRequest {
            model: "gpt-4o".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "hi".to_string(),
            }],
            temperature: Some(0.0),
            max_tokens: None,
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["temperature"], 0.0);
        assert!(value.get("max_tokens").is_none());
    }
}
