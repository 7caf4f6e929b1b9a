//! ListenBrainz client error types

use thiserror::Error;

/// ListenBrainz client errors
#[derive(Error, Debug)]
pub enum ListenBrainzError {
    /// Invalid input provided to an operation (rejected before any network call)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Service reached successfully but returned no usable data
    #[error("ListenBrainz returned no usable data")]
    NotFound,

    /// HTTP request failed
    #[error("ListenBrainz request error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Request timeout
    #[error("Request to ListenBrainz timed out")]
    Timeout,

    /// ListenBrainz returned a non-200 status
    #[error("ListenBrainz HTTP error: status {status}, body: {body}")]
    Service { status: u16, body: String },

    /// Response body did not match the expected JSON shape
    #[error("Failed to parse ListenBrainz response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Metadata capability this agent does not serve
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl ListenBrainzError {
    /// Check whether this error means "no usable data", as opposed to a
    /// transport or service failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, ListenBrainzError::NotFound)
    }
}

/// Result type for ListenBrainz operations
pub type ListenBrainzResult<T> = Result<T, ListenBrainzError>;
