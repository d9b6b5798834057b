use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the backend clients.
///
/// Nothing is retried or masked: every failure reaches the caller as one of these.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Base URL is not an absolute http(s) URL
    #[error("Invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Request did not complete within the client timeout
    #[error("Request to {path} timed out")]
    Timeout { path: String },

    /// Connection or transport failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend answered with a 4xx/5xx status
    #[error("HTTP {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// The persisted admin token could not be read or written
    #[error("Token store error: {0}")]
    TokenStore(String),
}

impl ApiError {
    /// Status code for `Status` errors
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 401/403, i.e. the caller should log in again.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        )
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
