//! Error Types

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// Required credential absent from the environment
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// Generation service failure (network, timeout, non-2xx)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Generation service returned an unexpected payload shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl CoreError {
    /// Whether the resolver should drop to the rule-based fallback path
    /// instead of surfacing this error to the user.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CoreError::MissingCredential(_)
                | CoreError::Provider(_)
                | CoreError::MalformedResponse(_)
        )
    }
}

impl From<anyhow::Error> for CoreError {
    fn from(err: anyhow::Error) -> Self {
        CoreError::Other(err.to_string())
    }
}
