//! Client error types.

use thiserror::Error;

/// Convenience alias for client return types.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by the request pipeline.
///
/// `Clone` so that every waiter on a coalesced request receives the same
/// outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// 401: credentials were purged and the user sent to the login page.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-success status, carrying the server's message or the
    /// status text.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

impl ApiError {
    /// HTTP status of the failure, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether repeating the request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::Status { status, .. } => *status >= 500,
            ApiError::Unauthorized(_) | ApiError::Decode(_) | ApiError::InvalidHeader(_) => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}
