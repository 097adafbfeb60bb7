//! Generation Provider Strategy Pattern
//!
//! Defines a common interface over external text-generation services so the
//! resolver can work with any backend (Anthropic, a local model, a test
//! double) without code changes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;

/// Configuration for a generation request
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "claude-3-sonnet-20240229")
    pub model: String,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// System prompt carried separately from the dialogue
    #[serde(default)]
    pub system_prompt: Option<String>,
}

fn default_max_tokens() -> u32 {
    1000
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "claude-3-sonnet-20240229".into(),
            max_tokens: default_max_tokens(),
            system_prompt: None,
        }
    }
}

/// Response from a completion request
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Completion {
    /// The generated text
    pub content: String,

    /// Model that generated this response
    pub model: String,
}

/// Strategy trait for text-generation providers
///
/// Implement this trait to add support for new backends. The resolver works
/// exclusively through this interface.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Provider name (e.g., "Anthropic")
    fn name(&self) -> &str;

    /// Check if the provider is configured and reachable
    async fn health_check(&self) -> Result<bool>;

    /// Generate a completion from the dialogue
    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_options_defaults() {
        let opts = GenerationOptions::default();
        assert_eq!(opts.max_tokens, 1000);
        assert_eq!(opts.model, "claude-3-sonnet-20240229");
        assert!(opts.system_prompt.is_none());
    }
}
