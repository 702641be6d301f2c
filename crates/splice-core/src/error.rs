//! Error types for Splice.

use thiserror::Error;

/// Main error type for timeline and media operations.
#[derive(Error, Debug)]
pub enum SpliceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Media error: {0}")]
    Media(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Resource not found: {0}")]
    NotFound(String),
}

/// Result type alias for Splice operations.
pub type Result<T> = std::result::Result<T, SpliceError>;
