//! Plain text from rendered transcription pages
//!
//! Footnote markers (`<a class="note">`) and the footnote block
//! (`<div class="footnotes">`) are dropped so only the running text remains.

use super::{read_file, tidy, ExtractResult};
use scraper::{ElementRef, Html, Selector};
use std::path::Path;
use std::sync::LazyLock;

/// Elements whose text never ends up in the output
#[allow(clippy::expect_used)]
static SKIPPED: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a.note, div.footnotes, script, style, head, template")
        .expect("static selector is valid")
});

/// Elements that start a new line
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Extracts the readable text of an HTML page
///
/// # Example
///
/// ```
/// use dodis_harvest::extract::html_to_text;
///
/// let html = r##"<p>Bern<a class="note" href="#fn1">1</a>, 1. Mai</p>"##;
/// assert_eq!(html_to_text(html), "Bern, 1. Mai");
/// ```
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::new();
    collect_text(document.root_element(), &mut text);
    tidy(&text)
}

/// Reads an HTML file and extracts its text
pub fn html_file_to_text(path: &Path) -> ExtractResult<String> {
    let html = read_file(path)?;
    Ok(html_to_text(&html))
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            continue;
        }

        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };
        if SKIPPED.matches(&child) {
            continue;
        }

        let block = BLOCK_ELEMENTS.contains(&child.value().name());
        if block {
            out.push('\n');
        }
        collect_text(child, out);
        if block {
            out.push('\n');
        }
    }
}
