//! Pagination state of the sitemap walk
//!
//! This module tracks which listing page the crawl is on and how many pages
//! the archive reports, and decides whether another page may be requested.

/// Language filter value that accepts every document
pub const ALL_LANGUAGES: &str = "all";

/// Tracks the position of the crawl within the paginated listing
///
/// `current_page` only ever moves forward, one step per processed page.
/// `total_pages` starts as a guess (`seed + 2`) and is replaced by the value
/// the archive reports with every page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapState {
    /// Last page number that was handed out
    pub current_page: u32,

    /// Last known number of pages
    pub total_pages: u32,

    /// Language code documents must carry, or "all"
    pub language: String,
}

impl SitemapState {
    /// Creates the state for a walk starting at `seed_page`
    ///
    /// The placeholder total guarantees that at least one further page is
    /// requested before the archive's real total is known.
    pub fn new(seed_page: u32, language: impl Into<String>) -> Self {
        Self {
            current_page: seed_page,
            total_pages: seed_page.saturating_add(2),
            language: language.into(),
        }
    }

    /// Advances to the next page
    ///
    /// Moves `current_page` forward by exactly one and returns the new page
    /// number if it is still within the last known total.
    ///
    /// # Returns
    ///
    /// * `Some(page)` - The next page should be requested
    /// * `None` - The walk has reached the known end
    pub fn advance(&mut self) -> Option<u32> {
        self.current_page = self.current_page.checked_add(1)?;
        if self.current_page <= self.total_pages {
            Some(self.current_page)
        } else {
            None
        }
    }

    /// Replaces the page total with the value reported by the archive
    pub fn update_total(&mut self, total_pages: u32) {
        self.total_pages = total_pages;
    }

    /// Returns true if a document in `lang_code` passes the language filter
    pub fn accepts(&self, lang_code: &str) -> bool {
        self.language == ALL_LANGUAGES || self.language == lang_code
    }
}
