//! Crawl statistics
//!
//! Counters are updated by workers and handlers while the crawl runs and are
//! turned into a [`CrawlSummary`] once it has finished.

use crate::url::DocumentKind;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by every crawl task
#[derive(Debug, Default)]
pub struct CrawlStatistics {
    enqueued: AtomicU64,
    sitemaps: AtomicU64,
    documents: AtomicU64,
    html_pages: AtomicU64,
    facsimiles: AtomicU64,
    fetch_failures: AtomicU64,
    handler_failures: AtomicU64,
}

impl CrawlStatistics {
    /// Records a URL entering the queue
    pub fn record_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a download that was fetched and stored
    pub fn record_fetched(&self, kind: DocumentKind) {
        self.counter(kind).fetch_add(1, Ordering::Relaxed);
    }

    /// Records a URL dropped by a worker
    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a sitemap page or document record that could not be processed
    pub fn record_handler_failure(&self) {
        self.handler_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of downloads stored so far, all kinds together
    pub fn fetched_total(&self) -> u64 {
        DocumentKind::ALL
            .iter()
            .map(|kind| self.counter(*kind).load(Ordering::Relaxed))
            .sum()
    }

    /// Number of URLs queued so far
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    /// Snapshots the counters into a summary
    pub fn summarize(&self, started_at: DateTime<Utc>, finished_at: DateTime<Utc>) -> CrawlSummary {
        let fetched_by_kind = DocumentKind::ALL
            .iter()
            .map(|kind| (*kind, self.counter(*kind).load(Ordering::Relaxed)))
            .collect();

        CrawlSummary {
            started_at,
            finished_at,
            urls_enqueued: self.enqueued(),
            fetched_by_kind,
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            handler_failures: self.handler_failures.load(Ordering::Relaxed),
        }
    }

    fn counter(&self, kind: DocumentKind) -> &AtomicU64 {
        match kind {
            DocumentKind::Sitemap => &self.sitemaps,
            DocumentKind::DocumentRecord => &self.documents,
            DocumentKind::HtmlPage => &self.html_pages,
            DocumentKind::Facsimile => &self.facsimiles,
        }
    }
}

/// Final numbers of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Total number of URLs that entered the queue
    pub urls_enqueued: u64,

    /// Stored downloads per kind
    pub fetched_by_kind: HashMap<DocumentKind, u64>,

    /// URLs dropped because fetching or storing failed
    pub fetch_failures: u64,

    /// Sitemap pages and document records that could not be parsed
    pub handler_failures: u64,
}

impl CrawlSummary {
    /// Stored downloads of one kind
    pub fn fetched(&self, kind: DocumentKind) -> u64 {
        self.fetched_by_kind.get(&kind).copied().unwrap_or(0)
    }

    /// Stored downloads of all kinds
    pub fn fetched_total(&self) -> u64 {
        self.fetched_by_kind.values().sum()
    }

    /// Wall-clock duration of the crawl in seconds
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Prints a summary to stdout in a formatted manner
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Run:");
    println!("  Started:  {}", summary.started_at.to_rfc3339());
    println!("  Finished: {}", summary.finished_at.to_rfc3339());
    println!("  Duration: {}s", summary.duration_seconds());
    println!();

    println!("Downloads by Kind:");
    for kind in DocumentKind::ALL {
        println!("  {}: {}", kind, summary.fetched(kind));
    }
    println!();

    println!("Errors:");
    println!("  Dropped URLs: {}", summary.fetch_failures);
    println!("  Unprocessable responses: {}", summary.handler_failures);
    println!();

    let success_rate = if summary.urls_enqueued > 0 {
        (summary.fetched_total() as f64 / summary.urls_enqueued as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} queued URLs stored)",
        success_rate,
        summary.fetched_total(),
        summary.urls_enqueued
    );
}
