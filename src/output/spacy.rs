//! spaCy training input

use serde::Serialize;

/// A text together with the tags it should be classified under
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpacyInput {
    pub text: String,
    pub tags: Vec<String>,
}

/// Serializes a text and its tags as one spaCy input record
///
/// # Example
///
/// ```
/// use dodis_harvest::output::to_spacy;
///
/// let json = to_spacy("Bern, 1. Mai", &["Italy".to_string()]).unwrap();
/// assert_eq!(json, r#"{"text":"Bern, 1. Mai","tags":["Italy"]}"#);
/// ```
pub fn to_spacy(text: &str, tags: &[String]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&SpacyInput {
        text: text.to_string(),
        tags: tags.to_vec(),
    })
}
