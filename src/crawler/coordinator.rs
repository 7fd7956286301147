//! Crawler coordinator - main crawl orchestration logic
//!
//! This module wires the crawl together:
//! - A fixed pool of fetch workers sharing one URL queue and one rate limiter
//! - A routing loop, the only consumer of fetch results
//! - A single sitemap actor that owns the pagination state
//! - A bounded pool of document post-processing tasks
//!
//! The crawl ends when the in-flight count drops to zero, that is when every
//! queued URL has been fetched (or dropped) and every result has been handled.

use crate::config::{validate, Config};
use crate::crawler::document::post_process_document;
use crate::crawler::fetcher::{build_http_client, FetchResult, Worker};
use crate::crawler::limiter::RateLimiter;
use crate::crawler::queue::{url_queue, InFlight, UrlQueue};
use crate::crawler::sitemap::{run_sitemap_actor, SitemapController};
use crate::output::{CrawlStatistics, CrawlSummary};
use crate::storage::{DocumentSink, FileStorage};
use crate::url::{ArchiveUrls, DocumentKind};
use crate::HarvestError;
use chrono::Utc;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// How often progress is logged while waiting for the crawl to finish
const PROGRESS_INTERVAL: Duration = Duration::from_secs(30);

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    client: Client,
    storage: Arc<dyn DocumentSink>,
    urls: ArchiveUrls,
}

impl Coordinator {
    /// Creates a coordinator writing to the configured documents directory
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - Invalid configuration, the documents directory
    ///   cannot be created or the HTTP client cannot be built
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        validate(&config)?;
        let storage = FileStorage::new(&config.output.documents_dir)?;
        Self::with_storage(config, Arc::new(storage))
    }

    /// Creates a coordinator writing to the given sink
    pub fn with_storage(config: Config, storage: Arc<dyn DocumentSink>) -> Result<Self, HarvestError> {
        validate(&config)?;
        let client = build_http_client(&config.crawler)?;
        let urls = ArchiveUrls::new(&config.archive.base_url)?;

        Ok(Self {
            config: Arc::new(config),
            client,
            storage,
            urls,
        })
    }

    /// Runs the crawl until no work is left
    ///
    /// Individual failures never abort the crawl; they are logged and
    /// counted in the returned summary.
    pub async fn run(self) -> Result<CrawlSummary, HarvestError> {
        let crawler = &self.config.crawler;
        let archive = &self.config.archive;
        let started_at = Utc::now();

        let stats = Arc::new(CrawlStatistics::default());
        let tracker = InFlight::new();
        let (queue, receiver) = url_queue(Arc::clone(&tracker), Arc::clone(&stats));
        let (results_tx, results_rx) = mpsc::channel(crawler.result_buffer);
        let shutdown = CancellationToken::new();
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(
            crawler.request_interval_ms,
        )));

        tracing::info!(
            "Starting crawl of {} at page {} (language: {}, {} workers, one request per {:?})",
            self.urls.base(),
            archive.start_page,
            archive.language,
            crawler.workers,
            limiter.period()
        );
        tracing::info!("Writing documents to {}", self.storage.root().display());

        let mut workers = JoinSet::new();
        for id in 0..crawler.workers {
            let worker = Worker {
                id,
                client: self.client.clone(),
                limiter: Arc::clone(&limiter),
                storage: Arc::clone(&self.storage),
                receiver: receiver.clone(),
                results: results_tx.clone(),
                stats: Arc::clone(&stats),
                shutdown: shutdown.clone(),
            };
            workers.spawn(worker.run());
        }
        // The router sees the result channel close once every worker is gone
        drop(results_tx);
        drop(receiver);

        let controller =
            SitemapController::new(self.urls.clone(), archive.start_page, archive.language.clone());
        let seed = controller.seed_url();

        let (sitemap_tx, sitemap_rx) = mpsc::unbounded_channel();
        let sitemap_stats = Arc::clone(&stats);
        let sitemap_actor = tokio::spawn(run_sitemap_actor(
            controller,
            sitemap_rx,
            queue.clone(),
            move |result, outcome| report_outcome(&sitemap_stats, result, outcome),
        ));

        let router = tokio::spawn(route_results(
            results_rx,
            sitemap_tx,
            queue.clone(),
            Arc::clone(&stats),
            crawler.post_process_limit,
        ));

        if !queue.push(seed) {
            tracing::error!("Could not seed the crawl");
        }

        wait_for_quiescence(&tracker, &stats).await;
        tracing::info!("No work left, shutting down");

        shutdown.cancel();
        while let Some(joined) = workers.join_next().await {
            joined?;
        }
        router.await?;
        sitemap_actor.await?;
        drop(queue);

        let summary = stats.summarize(started_at, Utc::now());
        tracing::info!(
            "Crawl completed: {} of {} queued URLs stored in {}s ({} dropped, {} unprocessable)",
            summary.fetched_total(),
            summary.urls_enqueued,
            summary.duration_seconds(),
            summary.fetch_failures,
            summary.handler_failures
        );

        Ok(summary)
    }
}

/// Waits until nothing is in flight, logging progress periodically
async fn wait_for_quiescence(tracker: &InFlight, stats: &CrawlStatistics) {
    let mut progress = tokio::time::interval(PROGRESS_INTERVAL);
    // The first tick completes immediately
    progress.tick().await;

    loop {
        tokio::select! {
            _ = tracker.wait_idle() => return,
            _ = progress.tick() => {
                tracing::info!(
                    "Progress: {} stored, {} queued so far, {} in flight",
                    stats.fetched_total(),
                    stats.enqueued(),
                    tracker.pending()
                );
            }
        }
    }
}

/// Dispatches fetch results by kind until every worker has stopped
///
/// Sitemap pages go to the sitemap actor, document records to a bounded
/// set of post-processing tasks. HTML pages and facsimiles produce nothing
/// further and are released right away.
async fn route_results(
    mut results: mpsc::Receiver<FetchResult>,
    sitemaps: mpsc::UnboundedSender<FetchResult>,
    queue: UrlQueue,
    stats: Arc<CrawlStatistics>,
    post_process_limit: usize,
) {
    let permits = Arc::new(Semaphore::new(post_process_limit));
    let mut handlers = JoinSet::new();

    loop {
        tokio::select! {
            Some(joined) = handlers.join_next(), if !handlers.is_empty() => {
                collect_handler(joined, &stats);
            }
            received = results.recv() => {
                let Some(result) = received else {
                    break;
                };

                match result.kind {
                    DocumentKind::Sitemap => {
                        if let Err(rejected) = sitemaps.send(result) {
                            tracing::error!("Sitemap actor is gone, discarding {}", rejected.0.url);
                        }
                    }
                    DocumentKind::DocumentRecord => {
                        let permit = match Arc::clone(&permits).acquire_owned().await {
                            Ok(permit) => permit,
                            Err(e) => {
                                tracing::error!("Post-processing unavailable, discarding {}: {}", result.url, e);
                                continue;
                            }
                        };
                        let queue = queue.clone();
                        let stats = Arc::clone(&stats);
                        handlers.spawn(async move {
                            let outcome = post_process_document(&result.url, &result.body, &queue);
                            report_outcome(&stats, &result, outcome);
                            drop(permit);
                        });
                    }
                    DocumentKind::HtmlPage | DocumentKind::Facsimile => {
                        tracing::trace!("Stored {} {}", result.kind, result.url);
                    }
                }
            }
        }
    }

    while let Some(joined) = handlers.join_next().await {
        collect_handler(joined, &stats);
    }
}

fn collect_handler(joined: Result<(), tokio::task::JoinError>, stats: &CrawlStatistics) {
    if let Err(e) = joined {
        stats.record_handler_failure();
        tracing::error!("Post-processing task failed: {}", e);
    }
}

/// Logs and counts the outcome of handling one result
fn report_outcome(
    stats: &CrawlStatistics,
    result: &FetchResult,
    outcome: Result<usize, HarvestError>,
) {
    match outcome {
        Ok(queued) => {
            tracing::debug!("Handled {} {}: {} URLs queued", result.kind, result.url, queued);
        }
        Err(e) => {
            stats.record_handler_failure();
            tracing::warn!("Could not process {} {}: {}", result.kind, result.url, e);
        }
    }
}

/// Runs the main crawl operation
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl finished
/// * `Err(HarvestError)` - Crawl could not be started
///
/// # Example
///
/// ```no_run
/// use dodis_harvest::config::load_config;
/// use dodis_harvest::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let summary = run_crawl(config).await?;
/// println!("{} files stored", summary.fetched_total());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlSummary, HarvestError> {
    Coordinator::new(config)?.run().await
}
