//! Error types for the puzzle client

use puzzle::LoadError;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid API address: {0}")]
    InvalidAddress(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Not found")]
    NotFound,

    #[error("Server returned invalid data: {0}")]
    InvalidResponse(String),

    #[error("Server rejected the request: {0}")]
    Rejected(String),

    #[error("Mock response not configured for: {0}")]
    NotConfigured(String),
}

impl ClientError {
    /// Map to the loader's error kinds.
    pub fn into_load_error(self) -> LoadError {
        match self {
            Self::NotFound | Self::Rejected(_) => LoadError::NotFound,
            Self::InvalidResponse(reason) => LoadError::InvalidPuzzle(reason),
            other => LoadError::NetworkFailure(other.to_string()),
        }
    }
}
