//! Storage traits and error types
//!
//! This module defines the trait interface for document sinks and the
//! associated error types.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No valid filename: '{0}'")]
    InvalidFilename(String),

    #[error("Cannot prepare documents directory {}: {source}", .path.display())]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Destination for downloaded response bodies
///
/// Implementations must be safe to share between workers. Writing the same
/// filename twice replaces the earlier content; readers never observe a
/// partially written file.
pub trait DocumentSink: Send + Sync {
    /// Stores `bytes` under `filename`
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Where the content was written
    /// * `Err(StorageError::InvalidFilename)` - The filename is empty or not a plain file name
    /// * `Err(StorageError)` - The write failed
    fn save(&self, filename: &str, bytes: &[u8]) -> StorageResult<PathBuf>;

    /// Directory all documents are written to
    fn root(&self) -> &Path;
}
