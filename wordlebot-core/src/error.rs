//! Error types for wordlebot-core

use thiserror::Error;

/// Main error type for the wordlebot-core library
///
/// Text that is not a puzzle result is never an error; the parser reports it
/// as a [`Rejection`](crate::parser::Rejection) value instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error (row detail, message exports)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// The paste pattern could not be compiled
    #[error("invalid paste pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Attempt store is unusable
    #[error("attempt store error: {0}")]
    Store(String),

    /// A message source failed to supply messages
    #[error("message source {source_name} failed: {message}")]
    MessageSource {
        source_name: String,
        message: String,
    },
}

/// Result type alias for wordlebot-core
pub type Result<T> = std::result::Result<T, Error>;
