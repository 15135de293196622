//! Error types for StegFS
//!
//! Provides a unified error type for all store operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using StegError
pub type Result<T> = std::result::Result<T, StegError>;

/// Unified error type for StegFS operations
#[derive(Debug, Error)]
pub enum StegError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: u64, actual: u64 },

    #[error("Out of memory: cannot allocate {requested} bytes")]
    OutOfMemory { requested: u64 },

    // -------------------------------------------------------------------------
    // Container Errors
    // -------------------------------------------------------------------------
    #[error("Container not found: {}", .0.display())]
    ContainerNotFound(PathBuf),

    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("Truncated header: expected {expected} bytes, got {actual}")]
    TruncatedHeader { expected: usize, actual: usize },

    #[error("Invalid container format: {0}")]
    InvalidFormat(String),

    #[error("Insufficient space: need {needed} bytes, {available} available")]
    InsufficientSpace { needed: u64, available: u64 },

    // -------------------------------------------------------------------------
    // Directory Errors
    // -------------------------------------------------------------------------
    #[error("Directory full: all {capacity} slots are in use")]
    DirectoryFull { capacity: usize },

    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid file name: {0}")]
    InvalidName(String),

    #[error("Refusing to store empty file: {0}")]
    EmptyFile(String),

    #[error("Store is opened read-only")]
    ReadOnly,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StegError {
    /// True for a missing container path or a missing named entry
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ContainerNotFound(_) | Self::FileNotFound(_))
    }

    /// True for a bad magic signature or a header shorter than expected
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, Self::InvalidFormat(_) | Self::TruncatedHeader { .. })
    }

    /// Translate an error from opening `path` into the matching variant
    pub(crate) fn from_open(err: std::io::Error, path: &std::path::Path) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::ContainerNotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io(err),
        }
    }
}
