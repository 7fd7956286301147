//! Document record model and post-processing
//!
//! A document record lists the document's attachments. The transcription
//! and the facsimile scan are queued for download; everything else is left
//! alone.

use crate::crawler::queue::UrlQueue;
use crate::HarvestError;
use serde::{Deserialize, Deserializer};

/// Attachment type of TEI transcriptions
pub const XML_TRANSCRIPTION: &str = "xml_transcription";

/// Attachment type of PDF files
pub const PDF: &str = "pdf";

/// Document attachment type of scans of the original
pub const FACSIMILE: &str = "Facsimile";

/// Top-level shape of a document response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: DocumentRecord,
}

/// The archive's record of one document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub related_tags: Vec<RelatedTag>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attachments: Vec<DocumentAttachment>,
}

/// A tag linked to a document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedTag {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tag_id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub main_tag: bool,
}

/// An attachment as listed on a document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAttachment {
    #[serde(default, deserialize_with = "null_as_default")]
    pub document_attachment_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attachment: Attachment,
}

/// The file behind an attachment
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(default, deserialize_with = "null_as_default")]
    pub attachment_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub presigned_url: String,
}

impl DocumentAttachment {
    /// Returns true for transcriptions and facsimile scans with a download link
    pub fn is_wanted(&self) -> bool {
        if self.attachment.presigned_url.is_empty() {
            return false;
        }

        match self.attachment.attachment_type.as_str() {
            XML_TRANSCRIPTION => true,
            PDF => self.document_attachment_type == FACSIMILE,
            _ => false,
        }
    }
}

impl DocumentRecord {
    /// Download links of the attachments worth fetching
    pub fn attachment_urls(&self) -> impl Iterator<Item = &str> {
        self.attachments
            .iter()
            .filter(|a| a.is_wanted())
            .map(|a| a.attachment.presigned_url.as_str())
    }

    /// Names of the tags flagged as main tags
    pub fn main_tags(&self) -> Vec<String> {
        self.related_tags
            .iter()
            .filter(|t| t.main_tag)
            .map(|t| t.name.clone())
            .collect()
    }
}

/// Parses a document response body
pub fn parse_document(url: &str, body: &[u8]) -> Result<DocumentRecord, HarvestError> {
    serde_json::from_slice::<DocumentEnvelope>(body)
        .map(|envelope| envelope.data)
        .map_err(|source| HarvestError::Json {
            url: url.to_string(),
            source,
        })
}

/// Queues the transcription and facsimile of a fetched document
///
/// # Returns
///
/// * `Ok(usize)` - Number of attachment URLs queued
/// * `Err(HarvestError::Json)` - The body is not a document record; nothing was queued
pub fn post_process_document(
    url: &str,
    body: &[u8],
    queue: &UrlQueue,
) -> Result<usize, HarvestError> {
    let record = parse_document(url, body)?;

    let mut queued = 0;
    for attachment_url in record.attachment_urls() {
        if queue.push(attachment_url) {
            queued += 1;
        }
    }

    tracing::debug!("Queued {} attachments of {}", queued, url);
    Ok(queued)
}

/// Treats an explicit JSON `null` like a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
