//! # navigator-core
//!
//! Core conversation and generation-provider abstractions for the
//! defi-navigator system.
//!
//! The `GenerationProvider` trait enables swapping between the Anthropic
//! API, a local model, or a deterministic test double without changing
//! resolver logic.

pub mod error;
pub mod message;
pub mod provider;

pub use error::{CoreError, Result};
pub use message::{Conversation, Message, Role};
pub use provider::{Completion, GenerationOptions, GenerationProvider};
