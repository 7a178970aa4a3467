//! Error types for GitLab API access and hook reconciliation.

use thiserror::Error;

/// Errors that can occur while talking to a GitLab server.
#[derive(Debug, Error)]
pub enum ScmError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success response
    #[error("GitLab API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Requested resource does not exist (or is not visible to the token)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ScmError {
    /// Whether this error means the remote resource is absent.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
