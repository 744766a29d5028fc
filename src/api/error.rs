use thiserror::Error;

/// Errors from practice API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the bearer token. The session context has
    /// already been evicted by the time this is returned.
    #[error("not authenticated")]
    Unauthorized,

    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}
