//! Error types for the resolver client.

use thiserror::Error;

/// Errors that can occur when talking to a resolution server.
#[derive(Error, Debug)]
pub enum ResolverError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Invalid server or playlist URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Client configuration rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Stream resolution succeeded but carried no URL
    #[error("No stream URL returned for {0}")]
    MissingStreamUrl(String),
}

/// Result type for resolver operations.
pub type Result<T> = std::result::Result<T, ResolverError>;
