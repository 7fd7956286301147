//! Builders for the URLs the crawler requests from the archive

use url::Url;

/// Query string of the document listing, without the page parameter
const SITEMAP_QUERY: &str = "q=*&c=Document&f=All&t=all&cb=doc";

/// URL factory bound to one archive base URL
#[derive(Debug, Clone)]
pub struct ArchiveUrls {
    base: String,
}

impl ArchiveUrls {
    /// Creates a factory for the given base URL
    ///
    /// # Returns
    ///
    /// * `Ok(ArchiveUrls)` - The base URL parsed as an absolute URL
    /// * `Err(url::ParseError)` - The base URL is malformed
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        let parsed = Url::parse(base_url)?;
        let base = parsed.as_str().trim_end_matches('/').to_string();
        Ok(Self { base })
    }

    /// URL of a sitemap page
    ///
    /// # Examples
    ///
    /// ```
    /// use dodis_harvest::url::ArchiveUrls;
    ///
    /// let urls = ArchiveUrls::new("https://dodis.ch").unwrap();
    /// assert_eq!(
    ///     urls.sitemap_page(2),
    ///     "https://dodis.ch/search?q=*&c=Document&f=All&t=all&cb=doc&p=2"
    /// );
    /// ```
    pub fn sitemap_page(&self, page: u32) -> String {
        format!("{}/search?{}&p={}", self.base, SITEMAP_QUERY, page)
    }

    /// URL of a single document record
    pub fn document(&self, id: u64) -> String {
        format!("{}/{}", self.base, id)
    }

    /// The normalized base URL, without trailing slash
    pub fn base(&self) -> &str {
        &self.base
    }
}
