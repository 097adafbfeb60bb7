//! # navigator-runtime
//!
//! Runtime providers for the defi-navigator system.
//!
//! ## Providers
//!
//! - **Anthropic** (default): Claude completions over the Messages API
//!
//! ## Usage
//!
//! ```rust,ignore
//! use navigator_runtime::AnthropicProvider;
//!
//! let provider = AnthropicProvider::from_env();
//! let completion = provider.complete(&messages, &options).await?;
//! ```

pub mod anthropic;

pub use anthropic::{AnthropicConfig, AnthropicProvider};

// Re-export core types for convenience
pub use navigator_core::{
    Completion, Conversation, CoreError, GenerationOptions, GenerationProvider, Message, Result,
    Role,
};
