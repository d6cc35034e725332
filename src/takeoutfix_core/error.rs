use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TakeoutError {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Filesystem errors
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    // Sidecar errors
    #[error("Malformed sidecar {path}: {reason}")]
    MalformedSidecar { path: PathBuf, reason: String },

    // Metadata errors
    #[error("Failed to embed metadata into {path}: {reason}")]
    EmbeddedMetadata { path: PathBuf, reason: String },

    #[error("Failed to set file times on {path}: {source}")]
    FilesystemTimestamp {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Date parsing error: {0}")]
    InvalidDateFormat(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(PathBuf),
}

/// Result type for takeoutfix operations.
pub type Result<T> = std::result::Result<T, TakeoutError>;
