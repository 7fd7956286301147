//! Plain text from TEI transcriptions
//!
//! Only the `<body>` counts. Editorial notes and headings are removed, then
//! every remaining tag is stripped with a space left in its place.

use super::{read_file, tidy, ExtractResult};
use regex::Regex;
use scraper::Html;
use std::path::Path;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<body\b[^>]*>(.*?)</body>").expect("static regex is valid"));

#[allow(clippy::expect_used)]
static NOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<note\b[^>]*>.*?</note>").expect("static regex is valid"));

#[allow(clippy::expect_used)]
static HEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<head\b[^>]*>.*?</head>").expect("static regex is valid"));

/// Extracts the running text of a TEI document
///
/// Returns an empty string when the document has no `<body>`.
pub fn xml_to_text(xml: &str) -> String {
    let Some(body) = BODY.captures(xml).and_then(|c| c.get(1)) else {
        tracing::debug!("No <body> in TEI document");
        return String::new();
    };

    let body = NOTE.replace_all(body.as_str(), "");
    let body = HEAD.replace_all(&body, "");

    // The HTML parser is lenient enough for TEI markup and decodes entities
    let fragment = Html::parse_fragment(&body);
    let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");

    tidy(&text)
}

/// Reads a TEI file and extracts its text
pub fn xml_file_to_text(path: &Path) -> ExtractResult<String> {
    let xml = read_file(path)?;
    Ok(xml_to_text(&xml))
}
