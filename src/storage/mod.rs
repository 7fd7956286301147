//! Storage module for persisting downloads
//!
//! This module handles everything that touches the documents directory:
//! - Writing response bodies under the filename the classifier chose
//! - Replacing files atomically so readers never see partial content
//! - Pruning documents that have no transcription

mod clean;
mod traits;

pub use clean::{clean_documents, CleanReport};
pub use traits::{DocumentSink, StorageError, StorageResult};

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Distinguishes temporary files of concurrent writes to the same name
static WRITE_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Document sink backed by a flat directory on the local filesystem
#[derive(Debug)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Opens the documents directory, creating it if necessary
    ///
    /// # Arguments
    ///
    /// * `root` - Path of the documents directory
    ///
    /// # Returns
    ///
    /// * `Ok(FileStorage)` - The directory exists and is ready
    /// * `Err(StorageError::Directory)` - The directory could not be created
    pub fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root).map_err(|source| StorageError::Directory {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }
}

impl DocumentSink for FileStorage {
    fn save(&self, filename: &str, bytes: &[u8]) -> StorageResult<PathBuf> {
        validate_filename(filename)?;

        let target = self.root.join(filename);
        let sequence = WRITE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let staging = self
            .root
            .join(format!(".{}.{}.{}.part", filename, std::process::id(), sequence));

        // Write the whole buffer next to the target, then swap it in
        if let Err(source) = std::fs::write(&staging, bytes) {
            let _ = std::fs::remove_file(&staging);
            return Err(StorageError::Write {
                path: target,
                source,
            });
        }

        if let Err(source) = std::fs::rename(&staging, &target) {
            let _ = std::fs::remove_file(&staging);
            return Err(StorageError::Write {
                path: target,
                source,
            });
        }

        tracing::trace!("Wrote {} bytes to {}", bytes.len(), target.display());
        Ok(target)
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

/// Rejects names that are empty or would escape the documents directory
fn validate_filename(filename: &str) -> StorageResult<()> {
    if filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains('/')
        || filename.contains('\\')
    {
        return Err(StorageError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}
