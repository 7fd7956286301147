//! Identifier extraction from archive URLs

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Archive identifier as it appears in attachment URLs, e.g. `dodis-48213`
#[allow(clippy::expect_used)]
static ARCHIVE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"dodis-(\d+)").expect("archive id regex is valid"));

#[allow(clippy::expect_used)]
static PAGE_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"p=(\d+)").expect("page regex is valid"));

#[allow(clippy::expect_used)]
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("number regex is valid"));

/// Extracts the numeric archive identifier from a URL
///
/// # Examples
///
/// ```
/// use dodis_harvest::url::extract_id;
///
/// assert_eq!(extract_id("https://s3.example.org/dodis-48213.pdf"), Some("48213"));
/// assert_eq!(extract_id("https://s3.example.org/scan.pdf"), None);
/// ```
pub fn extract_id(url: &str) -> Option<&str> {
    ARCHIVE_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Extracts the value of the first `p=` parameter from a sitemap URL
pub fn sitemap_page(url: &str) -> Option<&str> {
    PAGE_PARAM
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Returns the first run of digits in the URL's path and query
///
/// For absolute URLs the scheme, host and port are skipped; anything that
/// does not parse as a URL is searched as a whole.
pub fn first_number(url: &str) -> Option<String> {
    let locator = match Url::parse(url) {
        Ok(parsed) if parsed.has_host() => match parsed.query() {
            Some(query) => format!("{}?{}", parsed.path(), query),
            None => parsed.path().to_string(),
        },
        _ => url.to_string(),
    };

    NUMBER.find(&locator).map(|m| m.as_str().to_string())
}
