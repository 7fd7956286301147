//! Main tags of a stored document record

use super::{read_file, ExtractError, ExtractResult};
use crate::crawler::document::DocumentEnvelope;
use std::path::Path;

/// Returns the names of the tags flagged as main tags in a stored document
pub fn main_tags(path: &Path) -> ExtractResult<Vec<String>> {
    let json = read_file(path)?;
    main_tags_from_slice(path, json.as_bytes())
}

/// Like [`main_tags`], for a document record already in memory
pub fn main_tags_from_slice(path: &Path, json: &[u8]) -> ExtractResult<Vec<String>> {
    let envelope: DocumentEnvelope =
        serde_json::from_slice(json).map_err(|source| ExtractError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(envelope.data.main_tags())
}
