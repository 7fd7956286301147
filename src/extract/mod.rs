//! Text extraction from stored downloads
//!
//! Turns transcriptions into plain text, counts their words and reads the
//! main tags of a stored document record. These run on the documents
//! directory after a crawl.

mod frequency;
mod html;
mod tags;
mod xml;

pub use frequency::{TokenFrequency, MIN_WORD_LENGTH};
pub use html::{html_file_to_text, html_to_text};
pub use tags::{main_tags, main_tags_from_slice};
pub use xml::{xml_file_to_text, xml_to_text};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while extracting text or tags
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed document JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Expected an .xml or .html file, got {}", .0.display())]
    UnsupportedFile(PathBuf),
}

/// Result type alias for extraction operations
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Extracts the text of a stored transcription, picked by file extension
pub fn text_from_file(path: &Path) -> ExtractResult<String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("xml") => xml_file_to_text(path),
        Some("html") => html_file_to_text(path),
        _ => Err(ExtractError::UnsupportedFile(path.to_path_buf())),
    }
}

pub(crate) fn read_file(path: &Path) -> ExtractResult<String> {
    std::fs::read_to_string(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Collapses runs of whitespace inside lines and drops repeated blank lines
pub(crate) fn tidy(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() && lines.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        lines.push(line);
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}
