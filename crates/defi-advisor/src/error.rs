//! Error Types for the DeFi Advisor

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {
    /// User-supplied pair string not parseable; the one error surfaced
    /// to the caller as a validation message
    #[error("Invalid pool identifier: {0}")]
    InvalidPool(String),

    /// Remote data source failure (timeout, non-2xx)
    #[error("Remote data error: {0}")]
    RemoteData(String),

    /// Unexpected payload shape from a data source
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Required credential absent from the environment
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] navigator_core::CoreError),
}
