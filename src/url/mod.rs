//! URL handling module for Dodis-Harvest
//!
//! This module classifies archive URLs by their shape, derives the filename a
//! download is stored under, and builds the sitemap and document URLs the
//! crawler requests.

mod build;
mod id;

use std::fmt;

// Re-export main functions
pub use build::ArchiveUrls;
pub use id::{extract_id, first_number, sitemap_page};

/// Kind of resource behind a crawl URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// A page of the paginated search listing
    Sitemap,
    /// The JSON record of a single document
    DocumentRecord,
    /// A rendered transcription page
    HtmlPage,
    /// A PDF scan of the original document
    Facsimile,
}

impl DocumentKind {
    /// All kinds, in classification order
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::Sitemap,
        DocumentKind::HtmlPage,
        DocumentKind::Facsimile,
        DocumentKind::DocumentRecord,
    ];
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Sitemap => "sitemap",
            Self::DocumentRecord => "document",
            Self::HtmlPage => "html",
            Self::Facsimile => "facsimile",
        };
        f.write_str(label)
    }
}

/// Outcome of classifying a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub kind: DocumentKind,
    /// Target filename inside the documents directory; empty when the URL
    /// carries nothing to name the file after
    pub filename: String,
}

impl Classified {
    /// Returns true if the download can be written to disk
    pub fn is_persistable(&self) -> bool {
        !self.filename.is_empty()
    }
}

/// Classifies a URL by shape and derives its target filename
///
/// The checks run in a fixed order and the first match wins:
/// 1. contains `search` → [`DocumentKind::Sitemap`], `sitemap-{p}.json`
/// 2. contains `html` → [`DocumentKind::HtmlPage`], `{id}.html`
/// 3. contains `pdf` → [`DocumentKind::Facsimile`], `{id}.pdf`
/// 4. anything else → [`DocumentKind::DocumentRecord`], `{n}.json`
///
/// `{p}` is the `p=` query value (0 if absent), `{id}` comes from
/// [`extract_id`] and `{n}` is the first number in the URL's path.
///
/// # Examples
///
/// ```
/// use dodis_harvest::url::{classify, DocumentKind};
///
/// let c = classify("https://dodis.ch/search?q=*&c=Document&p=4");
/// assert_eq!(c.kind, DocumentKind::Sitemap);
/// assert_eq!(c.filename, "sitemap-4.json");
///
/// let c = classify("https://dodis.ch/48213");
/// assert_eq!(c.kind, DocumentKind::DocumentRecord);
/// assert_eq!(c.filename, "48213.json");
/// ```
pub fn classify(url: &str) -> Classified {
    if url.contains("search") {
        let page = sitemap_page(url).unwrap_or("0");
        return Classified {
            kind: DocumentKind::Sitemap,
            filename: format!("sitemap-{}.json", page),
        };
    }

    if url.contains("html") {
        return Classified {
            kind: DocumentKind::HtmlPage,
            filename: extract_id(url)
                .map(|id| format!("{}.html", id))
                .unwrap_or_default(),
        };
    }

    if url.contains("pdf") {
        return Classified {
            kind: DocumentKind::Facsimile,
            filename: extract_id(url)
                .map(|id| format!("{}.pdf", id))
                .unwrap_or_default(),
        };
    }

    Classified {
        kind: DocumentKind::DocumentRecord,
        filename: first_number(url)
            .map(|n| format!("{}.json", n))
            .unwrap_or_default(),
    }
}
