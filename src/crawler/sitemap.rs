//! Sitemap controller
//!
//! Walks the archive's paginated document listing. Each processed page queues
//! the next page first and then the documents listed on it. The walk is
//! strictly sequential: one page in flight ahead of the one being processed,
//! never more, so the listing endpoint is not flooded.

use crate::crawler::document::null_as_default;
use crate::crawler::fetcher::FetchResult;
use crate::crawler::queue::UrlQueue;
use crate::state::SitemapState;
use crate::url::ArchiveUrls;
use crate::HarvestError;
use serde::Deserialize;
use tokio::sync::mpsc;

/// One page of the document listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<SitemapEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_page: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_pages: u32,
}

/// A document listed on a sitemap page
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapEntry {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lang_code: String,
}

/// What processing one sitemap page produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapOutcome {
    /// Page number queued next, if any
    pub next_page: Option<u32>,
    /// Number of document URLs queued
    pub documents: usize,
}

/// Owns the pagination state of one crawl
#[derive(Debug)]
pub struct SitemapController {
    state: SitemapState,
    urls: ArchiveUrls,
}

impl SitemapController {
    /// Creates a controller whose walk starts at `seed_page`
    pub fn new(urls: ArchiveUrls, seed_page: u32, language: impl Into<String>) -> Self {
        Self {
            state: SitemapState::new(seed_page, language),
            urls,
        }
    }

    /// URL of the page the walk starts from
    pub fn seed_url(&self) -> String {
        self.urls.sitemap_page(self.state.current_page)
    }

    /// Current pagination state
    pub fn state(&self) -> &SitemapState {
        &self.state
    }

    /// Processes one fetched sitemap page
    ///
    /// The next page is queued before the body is parsed, bounded by the
    /// total known at this moment. The total is then replaced with the one
    /// this page reports, so the page after a shrinking total can still be
    /// requested once.
    ///
    /// # Returns
    ///
    /// * `Ok(SitemapOutcome)` - What was queued
    /// * `Err(HarvestError::Json)` - The page is malformed; only the next page was queued
    pub fn handle_page(
        &mut self,
        url: &str,
        body: &[u8],
        queue: &UrlQueue,
    ) -> Result<SitemapOutcome, HarvestError> {
        let next_page = self.state.advance();
        if let Some(page) = next_page {
            queue.push(self.urls.sitemap_page(page));
        }

        let page: SitemapPage =
            serde_json::from_slice(body).map_err(|source| HarvestError::Json {
                url: url.to_string(),
                source,
            })?;

        let mut documents = 0;
        for entry in &page.data {
            if self.state.accepts(&entry.lang_code) && queue.push(self.urls.document(entry.id)) {
                documents += 1;
            }
        }

        self.state.update_total(page.total_pages);

        tracing::info!(
            "Sitemap page {}/{}: queued {} of {} documents",
            page.current_page,
            page.total_pages,
            documents,
            page.data.len()
        );

        Ok(SitemapOutcome {
            next_page,
            documents,
        })
    }
}

/// Processes sitemap results one at a time until the sender side closes
///
/// The controller is owned by this task alone, so pagination state is never
/// touched concurrently. Each result's work token is released only after its
/// page has been handled.
pub(crate) async fn run_sitemap_actor(
    mut controller: SitemapController,
    mut results: mpsc::UnboundedReceiver<FetchResult>,
    queue: UrlQueue,
    report: impl Fn(&FetchResult, Result<usize, HarvestError>),
) {
    while let Some(result) = results.recv().await {
        let outcome = controller
            .handle_page(&result.url, &result.body, &queue)
            .map(|o| o.documents);
        report(&result, outcome);
    }

    tracing::debug!(
        "Sitemap walk ended at page {} of {}",
        controller.state().current_page,
        controller.state().total_pages
    );
}
