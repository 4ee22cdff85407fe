//! Error types for revcryptfs

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Exclusion errors
    #[error("Failed to read exclude file {path:?}: {source}")]
    PatternFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid exclude pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    // Filesystem errors
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// POSIX error code to reply with when this error reaches the FUSE layer
    pub fn errno(&self) -> i32 {
        match self {
            Error::PathNotFound(_) => libc::ENOENT,
            Error::Io(e) => e.raw_os_error().unwrap_or(libc::EIO),
            _ => libc::EINVAL,
        }
    }
}
