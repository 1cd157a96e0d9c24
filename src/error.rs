//! Error types for the throwback service.

use throwback_photos::PhotosError;

/// Top-level error type for the throwback service.
#[derive(Debug, thiserror::Error)]
pub enum ThrowbackError {
    /// Configuration error. Fatal at startup.
    #[error("config error: {0}")]
    Config(String),

    /// Photo server error (login, catalog listing). Aborts the current run.
    #[error("photo server error: {0}")]
    Photos(#[from] PhotosError),

    /// Mail transport construction error.
    #[error("mail error: {0}")]
    Mail(String),

    /// Web presenter error (bind, serve).
    #[error("web error: {0}")]
    Web(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ThrowbackError>;
