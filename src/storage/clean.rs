//! Pruning of documents without a transcription

use crate::storage::StorageResult;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Suffixes that belong to a transcribed document `{stem}`
const KEPT_SUFFIXES: [&str; 4] = [".html", ".xml", ".json", "-fq.json"];

/// Outcome of a cleanup pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    /// Number of documents that have a transcription
    pub transcribed: usize,
    /// Files that were kept
    pub kept: Vec<PathBuf>,
    /// Files that were removed
    pub removed: Vec<PathBuf>,
}

/// Removes every file whose document has no `.html` transcription
///
/// A document `{stem}` counts as transcribed when `{stem}.html` exists. Its
/// `{stem}.html`, `{stem}.xml`, `{stem}.json` and `{stem}-fq.json` files are
/// kept; every other regular file in the directory is deleted. Failure to
/// delete a single file is logged and does not stop the pass.
pub fn clean_documents(dir: &Path) -> StorageResult<CleanReport> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    let transcribed: HashSet<&str> = files
        .iter()
        .filter_map(|name| name.strip_suffix(".html"))
        .collect();

    let mut report = CleanReport {
        transcribed: transcribed.len(),
        ..CleanReport::default()
    };

    for name in &files {
        let path = dir.join(name);
        if belongs_to_transcribed(name, &transcribed) {
            report.kept.push(path);
            continue;
        }

        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Deleted {}", path.display());
                report.removed.push(path);
            }
            Err(e) => tracing::warn!("Failed to delete {}: {}", path.display(), e),
        }
    }

    tracing::info!(
        "Kept {} files of {} transcribed documents, removed {}",
        report.kept.len(),
        report.transcribed,
        report.removed.len()
    );

    Ok(report)
}

fn belongs_to_transcribed(name: &str, transcribed: &HashSet<&str>) -> bool {
    KEPT_SUFFIXES.iter().any(|suffix| {
        name.strip_suffix(suffix)
            .is_some_and(|stem| transcribed.contains(stem))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn test_keeps_transcribed_documents() {
        let tmp = TempDir::new().unwrap();
        for name in ["100.html", "100.json", "100.xml", "100-fq.json", "100.pdf"] {
            touch(tmp.path(), name);
        }

        let report = clean_documents(tmp.path()).unwrap();

        assert_eq!(report.transcribed, 1);
        assert_eq!(report.kept.len(), 4);
        assert_eq!(report.removed, vec![tmp.path().join("100.pdf")]);
        assert!(tmp.path().join("100.json").exists());
        assert!(!tmp.path().join("100.pdf").exists());
    }

    #[test]
    fn test_removes_untranscribed_documents() {
        let tmp = TempDir::new().unwrap();
        for name in ["200.json", "sitemap-1.json", "1000.json", "100.html"] {
            touch(tmp.path(), name);
        }

        let report = clean_documents(tmp.path()).unwrap();

        assert_eq!(report.kept, vec![tmp.path().join("100.html")]);
        assert_eq!(report.removed.len(), 3);
        // A longer id sharing a prefix is not the same document
        assert!(!tmp.path().join("1000.json").exists());
    }

    #[test]
    fn test_ignores_directories() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("nested")).unwrap();

        let report = clean_documents(tmp.path()).unwrap();

        assert!(report.removed.is_empty());
        assert!(tmp.path().join("nested").is_dir());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        assert!(clean_documents(&tmp.path().join("absent")).is_err());
    }
}
