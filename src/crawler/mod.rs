//! Crawler module for harvesting the archive
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and the worker pool
//! - Global request pacing
//! - The self-feeding URL queue and completion tracking
//! - Sitemap pagination and document post-processing
//! - Overall crawl coordination

mod coordinator;
pub mod document;
mod fetcher;
mod limiter;
mod queue;
pub mod sitemap;

pub use coordinator::{run_crawl, Coordinator};
pub use document::{parse_document, post_process_document, DocumentRecord};
pub use fetcher::{build_http_client, fetch_url, FetchResult, USER_AGENT};
pub use limiter::RateLimiter;
pub use queue::{url_queue, InFlight, QueuedUrl, UrlQueue, UrlReceiver, WorkToken};
pub use sitemap::{SitemapController, SitemapOutcome};

use crate::config::Config;
use crate::output::CrawlSummary;
use crate::HarvestError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration and create the documents directory
/// 2. Build the HTTP client
/// 3. Start the worker pool and seed the first sitemap page
/// 4. Follow sitemap pages, documents and attachments until no work is left
/// 5. Return the crawl summary
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl completed
/// * `Err(HarvestError)` - Crawl could not be started
pub async fn crawl(config: Config) -> Result<CrawlSummary, HarvestError> {
    run_crawl(config).await
}
