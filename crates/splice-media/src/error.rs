//! Error types for export compilation and execution.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while compiling or running an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// No encoder binary was configured or found.
    #[error("FFmpeg executable not found")]
    NoEncoderFound,

    /// The timeline has no clips.
    #[error("No clips on the timeline")]
    EmptyPlaylist,

    /// Every region has been cut.
    #[error("No segments to export")]
    EmptySegments,

    /// Settings that cannot produce a valid command.
    #[error("Invalid export settings: {0}")]
    InvalidSettings(String),

    /// Output extension outside mp4/mkv/webm.
    #[error("Unsupported container: {0}")]
    UnsupportedContainer(String),

    /// A clip or the external audio file does not exist.
    #[error("Source file not found: {}", .0.display())]
    SourceFileMissing(PathBuf),

    /// No kept segment intersects any clip.
    #[error("Nothing to export: no kept segment overlaps a clip")]
    NoExportableContent,

    /// Another export is still running.
    #[error("An export is already in progress")]
    AlreadyRunning,

    /// The encoder exited unsuccessfully; `stderr` is passed through untouched.
    #[error("FFmpeg error (exit code {code:?}):\n{stderr}")]
    EncoderFailure { code: Option<i32>, stderr: String },

    /// The export was cancelled and the encoder killed.
    #[error("Export cancelled")]
    Cancelled,

    /// IO error while spawning or talking to the encoder.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad error categories, for deciding how to present a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    MissingResource,
    NoExportableContent,
    EncoderFailure,
}

impl ExportError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoEncoderFound
            | Self::EmptyPlaylist
            | Self::EmptySegments
            | Self::InvalidSettings(_)
            | Self::UnsupportedContainer(_)
            | Self::AlreadyRunning => ErrorKind::Validation,
            Self::SourceFileMissing(_) => ErrorKind::MissingResource,
            Self::NoExportableContent => ErrorKind::NoExportableContent,
            Self::EncoderFailure { .. } | Self::Cancelled | Self::Io(_) => ErrorKind::EncoderFailure,
        }
    }
}

/// Result type alias for export operations.
pub type ExportResult<T> = std::result::Result<T, ExportError>;
