//! Error types for the throwback-photos crate.
//!
//! Messages never contain passwords or session identifiers.

/// Errors that can occur while talking to the photo server.
#[derive(Debug, thiserror::Error)]
pub enum PhotosError {
    /// The HTTP request could not be sent or the response body could not be read.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server answered with a non-success status code.
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        /// Logical endpoint name (`auth`, `browse`).
        endpoint: &'static str,
        /// HTTP status code.
        status: u16,
    },

    /// Login succeeded at the HTTP level but yielded no session.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The response body was not valid JSON.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for throwback-photos results.
pub type Result<T> = std::result::Result<T, PhotosError>;
