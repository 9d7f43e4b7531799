//! Error types for remote repository calls.

/// Errors that can occur while talking to the remote repository service.
#[derive(Debug, thiserror::Error)]
pub enum GithubError {
    /// The requested resource does not exist (HTTP 404). Several engine
    /// operations treat this as an explicit empty/default result.
    #[error("resource not found")]
    NotFound,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("client configuration error: {0}")]
    Config(String),
}

impl GithubError {
    /// True when this is the distinguished not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GithubError::NotFound)
    }
}

/// Result alias for remote repository operations.
pub type Result<T> = std::result::Result<T, GithubError>;
