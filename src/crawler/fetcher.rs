//! HTTP fetcher and worker loop
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client with the request deadline
//! - GET requests with the content-type header the archive expects
//! - The worker loop that paces, fetches, stores and forwards results

use crate::config::CrawlerConfig;
use crate::crawler::limiter::RateLimiter;
use crate::crawler::queue::{QueuedUrl, UrlReceiver, WorkToken};
use crate::output::CrawlStatistics;
use crate::storage::{DocumentSink, StorageError};
use crate::url::{classify, DocumentKind};
use crate::HarvestError;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("dodis-harvest/", env!("CARGO_PKG_VERSION"));

/// A download that was fetched and stored, on its way to the router
#[derive(Debug)]
pub struct FetchResult {
    /// URL the content was fetched from
    pub url: String,
    /// Kind assigned by the classifier
    pub kind: DocumentKind,
    /// Raw response body
    pub body: Vec<u8>,
    /// Keeps the URL in flight until the result has been handled
    pub token: WorkToken,
}

/// Builds the HTTP client shared by all workers
///
/// # Arguments
///
/// * `config` - The crawler configuration (request deadline)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.request_timeout_secs);

    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns the raw body
///
/// Every request except XML attachments announces `application/json`; the
/// archive's API answers in JSON only when asked to.
///
/// # Errors
///
/// | Condition | Error |
/// |-----------|-------|
/// | Deadline exceeded | [`HarvestError::Timeout`] |
/// | Connection or body read failure | [`HarvestError::Http`] |
/// | Non-success status | [`HarvestError::Status`] |
pub async fn fetch_url(client: &Client, url: &str) -> Result<Vec<u8>, HarvestError> {
    let mut request = client.get(url);
    if !url.contains("xml") {
        request = request.header(CONTENT_TYPE, "application/json");
    }

    let response = request
        .send()
        .await
        .map_err(|e| transport_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(HarvestError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| transport_error(url, e))?;

    Ok(body.to_vec())
}

fn transport_error(url: &str, source: reqwest::Error) -> HarvestError {
    if source.is_timeout() {
        HarvestError::Timeout {
            url: url.to_string(),
        }
    } else {
        HarvestError::Http {
            url: url.to_string(),
            source,
        }
    }
}

/// Everything a worker needs, cloned once per worker
#[derive(Clone)]
pub(crate) struct Worker {
    pub(crate) id: usize,
    pub(crate) client: Client,
    pub(crate) limiter: Arc<RateLimiter>,
    pub(crate) storage: Arc<dyn DocumentSink>,
    pub(crate) receiver: UrlReceiver,
    pub(crate) results: mpsc::Sender<FetchResult>,
    pub(crate) stats: Arc<CrawlStatistics>,
    pub(crate) shutdown: CancellationToken,
}

impl Worker {
    /// Runs until shutdown is signaled or the queue closes
    ///
    /// A failing URL is logged and dropped; the worker moves on to the next.
    pub(crate) async fn run(self) {
        tracing::debug!("Worker {} started", self.id);

        loop {
            let next = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => None,
                item = self.receiver.recv() => item,
            };

            let Some(QueuedUrl { url, token }) = next else {
                break;
            };

            match self.process(&url).await {
                Ok((kind, body)) => {
                    self.stats.record_fetched(kind);
                    let result = FetchResult {
                        url,
                        kind,
                        body,
                        token,
                    };
                    if self.results.send(result).await.is_err() {
                        tracing::warn!("Worker {}: result router is gone, stopping", self.id);
                        break;
                    }
                }
                Err(e) => {
                    self.stats.record_fetch_failure();
                    tracing::warn!("Worker {}: dropping {}: {}", self.id, url, e);
                }
            }
        }

        tracing::debug!("Worker {} stopped", self.id);
    }

    /// Fetches and stores one URL
    async fn process(&self, url: &str) -> Result<(DocumentKind, Vec<u8>), HarvestError> {
        let classified = classify(url);

        // Nothing to name the file after, so there is no point in fetching it
        if !classified.is_persistable() {
            return Err(StorageError::InvalidFilename(classified.filename).into());
        }

        self.limiter.acquire().await;
        tracing::debug!("Worker {}: fetching {}", self.id, url);

        let body = fetch_url(&self.client, url).await?;
        let (path, body) = self.persist(classified.filename, body).await?;
        tracing::debug!(
            "Worker {}: stored {} ({} bytes) as {}",
            self.id,
            classified.kind,
            body.len(),
            path.display()
        );

        Ok((classified.kind, body))
    }

    /// Writes the body off the async runtime and hands it back
    async fn persist(
        &self,
        filename: String,
        body: Vec<u8>,
    ) -> Result<(PathBuf, Vec<u8>), HarvestError> {
        let storage = Arc::clone(&self.storage);
        let (path, body) = tokio::task::spawn_blocking(move || {
            storage.save(&filename, &body).map(|path| (path, body))
        })
        .await??;
        Ok((path, body))
    }
}
