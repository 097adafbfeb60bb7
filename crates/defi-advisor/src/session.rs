//! Session Context
//!
//! Per-session state: conversation history plus the entity data cache.
//! Passed explicitly to each resolver call; there is no ambient/global state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use navigator_core::{Conversation, Message};

use crate::cache::DataCache;

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mutable session state owned by a single logical user
///
/// The cache and conversation live only for the lifetime of the session;
/// nothing is persisted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionContext {
    pub id: SessionId,
    pub conversation: Conversation,
    pub cache: DataCache,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionContext {
    /// Create an empty session
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            conversation: Conversation::new(),
            cache: DataCache::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a session opened by the assistant greeting
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let mut session = Self::new();
        session.conversation.push(Message::assistant(greeting));
        session
    }

    /// Update the activity timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Message count
    pub fn message_count(&self) -> usize {
        self.conversation.len()
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_creation() {
        let session = SessionContext::new();
        assert_eq!(session.message_count(), 0);
        assert!(session.cache.is_empty());
    }

    #[test]
    fn test_greeting_seeds_conversation() {
        let session = SessionContext::with_greeting("Hello!");
        assert_eq!(session.message_count(), 1);
        assert_eq!(session.conversation.last().unwrap().content, "Hello!");
    }
}
