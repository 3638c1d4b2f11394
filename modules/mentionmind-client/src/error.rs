use thiserror::Error;

pub type Result<T> = std::result::Result<T, MentionMindError>;

#[derive(Debug, Error)]
pub enum MentionMindError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl MentionMindError {
    /// Transient failures are worth another attempt after backoff.
    /// Auth failures and malformed responses never are.
    pub fn is_transient(&self) -> bool {
        match self {
            MentionMindError::Network(_) | MentionMindError::RateLimited { .. } => true,
            MentionMindError::Api { status, .. } => *status >= 500,
            MentionMindError::Auth(_) | MentionMindError::Parse(_) => false,
        }
    }
}

impl From<reqwest::Error> for MentionMindError {
    fn from(err: reqwest::Error) -> Self {
        MentionMindError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for MentionMindError {
    fn from(err: serde_json::Error) -> Self {
        MentionMindError::Parse(err.to_string())
    }
}
