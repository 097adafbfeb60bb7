//! Anthropic Generation Provider
//!
//! Implementation of `GenerationProvider` over the Anthropic Messages API.

use std::time::Duration;

use async_trait::async_trait;
use navigator_core::{
    error::{CoreError, Result},
    message::{Message, Role},
    provider::{Completion, GenerationOptions, GenerationProvider},
};
use serde::{Deserialize, Serialize};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Anthropic provider configuration
#[derive(Clone, Debug)]
pub struct AnthropicConfig {
    /// API key; `None` means the provider reports unhealthy and every
    /// completion fails with `MissingCredential`
    pub api_key: Option<String>,

    /// API endpoint URL
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: API_URL.into(),
            timeout_secs: 30,
        }
    }
}

impl AnthropicConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
            ..Default::default()
        }
    }
}

/// Anthropic Messages API provider
pub struct AnthropicProvider {
    client: reqwest::Client,
    config: AnthropicConfig,
}

/// Wire format: request message
#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Wire format: completion request
#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<WireMessage<'a>>,
}

/// Wire format: completion response
#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    content: Vec<WireContentBlock>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct WireContentBlock {
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicProvider {
    /// Create from configuration
    pub fn from_config(config: AnthropicConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self { client, config }
    }

    /// Create from environment variables (`ANTHROPIC_API_KEY`)
    pub fn from_env() -> Self {
        Self::from_config(AnthropicConfig::from_env())
    }

    /// Convert dialogue messages to the wire format, dropping system turns
    /// (the system prompt travels in its own request field)
    fn convert_messages(messages: &[Message]) -> Vec<WireMessage<'_>> {
        messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| WireMessage {
                role: match m.role {
                    Role::User => "user",
                    _ => "assistant",
                },
                content: &m.content,
            })
            .collect()
    }
}

#[async_trait]
impl GenerationProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "Anthropic"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.config.api_key.is_some())
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| CoreError::MissingCredential("ANTHROPIC_API_KEY".into()))?;

        let request = WireRequest {
            model: &options.model,
            max_tokens: options.max_tokens,
            system: options.system_prompt.as_deref(),
            messages: Self::convert_messages(messages),
        };
        tracing::debug!(model = %options.model, turns = request.messages.len(), "requesting completion");

        let response = self
            .client
            .post(&self.config.base_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| CoreError::Provider(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CoreError::Provider(format!(
                "request failed with status {status}: {body}"
            )));
        }

        let body: WireResponse = response
            .json()
            .await
            .map_err(|e| CoreError::MalformedResponse(e.to_string()))?;

        let content = body
            .content
            .first()
            .and_then(|block| block.text.clone())
            .ok_or_else(|| {
                CoreError::MalformedResponse("response is missing content[0].text".into())
            })?;

        Ok(Completion {
            content,
            model: body.model.unwrap_or_else(|| options.model.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AnthropicConfig::default();
        assert_eq!(config.base_url, API_URL);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_message_conversion_drops_system() {
        let messages = vec![
            Message::system("You are helpful."),
            Message::user("Hello"),
            Message::assistant("Hi!"),
        ];

        let converted = AnthropicProvider::convert_messages(&messages);
        assert_eq!(converted.len(), 2);
        assert_eq!(converted[0].role, "user");
        assert_eq!(converted[1].role, "assistant");
    }

    #[tokio::test]
    async fn test_missing_key_is_missing_credential() {
        let provider = AnthropicProvider::from_config(AnthropicConfig::default());
        assert!(!provider.health_check().await.unwrap());

        let err = provider
            .complete(&[Message::user("hi")], &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::MissingCredential(_)));
    }
}
