//! Self-feeding URL queue with quiescence detection
//!
//! Workers drain the queue while the sitemap controller and the document
//! post-processor refill it, so an empty queue says nothing about whether the
//! crawl is finished. Instead every queued URL carries a [`WorkToken`]. The
//! token is created (and the in-flight count raised) when the URL is pushed,
//! and it is dropped only after the URL and every push derived from it have
//! been handled. The crawl is idle when the count returns to zero.

use crate::output::CrawlStatistics;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, Notify};

/// Counts URLs that are queued or still being handled
#[derive(Debug, Default)]
pub struct InFlight {
    pending: AtomicUsize,
    idle: Notify,
}

impl InFlight {
    /// Creates a tracker with nothing in flight
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers one more unit of work
    pub fn token(self: &Arc<Self>) -> WorkToken {
        self.pending.fetch_add(1, Ordering::SeqCst);
        WorkToken {
            tracker: Arc::clone(self),
        }
    }

    /// Number of units currently in flight
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Waits until no work is in flight
    ///
    /// Returns immediately if nothing was ever registered, so call this only
    /// after the crawl has been seeded.
    pub async fn wait_idle(&self) {
        loop {
            // Register interest before checking so a wakeup between the
            // check and the await is not lost
            let notified = self.idle.notified();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Keeps one unit of work in flight until dropped
#[derive(Debug)]
pub struct WorkToken {
    tracker: Arc<InFlight>,
}

impl Drop for WorkToken {
    fn drop(&mut self) {
        if self.tracker.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.tracker.idle.notify_waiters();
        }
    }
}

/// A URL waiting for a worker, together with its work token
#[derive(Debug)]
pub struct QueuedUrl {
    pub url: String,
    pub token: WorkToken,
}

/// Producer handle of the URL queue
#[derive(Debug, Clone)]
pub struct UrlQueue {
    sender: mpsc::UnboundedSender<QueuedUrl>,
    tracker: Arc<InFlight>,
    stats: Arc<CrawlStatistics>,
}

impl UrlQueue {
    /// Enqueues a URL
    ///
    /// # Returns
    ///
    /// * `true` - The URL was queued
    /// * `false` - The queue is closed; the URL was discarded
    pub fn push(&self, url: impl Into<String>) -> bool {
        let item = QueuedUrl {
            url: url.into(),
            token: self.tracker.token(),
        };

        match self.sender.send(item) {
            Ok(()) => {
                self.stats.record_enqueued();
                true
            }
            Err(rejected) => {
                // The returned item drops here and releases its token
                tracing::warn!("Queue closed, discarding {}", rejected.0.url);
                false
            }
        }
    }

    /// The in-flight tracker shared by every handle of this queue
    pub fn tracker(&self) -> &Arc<InFlight> {
        &self.tracker
    }
}

/// Consumer handle of the URL queue, shared by all workers
#[derive(Debug, Clone)]
pub struct UrlReceiver {
    inner: Arc<Mutex<mpsc::UnboundedReceiver<QueuedUrl>>>,
}

impl UrlReceiver {
    /// Waits for the next URL
    ///
    /// Returns `None` once every producer handle is gone and the queue is
    /// drained.
    pub async fn recv(&self) -> Option<QueuedUrl> {
        self.inner.lock().await.recv().await
    }

    /// Takes every URL that is queued right now without waiting
    pub fn drain_ready(&self) -> Vec<QueuedUrl> {
        let mut drained = Vec::new();
        if let Ok(mut receiver) = self.inner.try_lock() {
            while let Ok(item) = receiver.try_recv() {
                drained.push(item);
            }
        }
        drained
    }
}

/// Creates a connected queue pair
pub fn url_queue(tracker: Arc<InFlight>, stats: Arc<CrawlStatistics>) -> (UrlQueue, UrlReceiver) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (
        UrlQueue {
            sender,
            tracker,
            stats,
        },
        UrlReceiver {
            inner: Arc::new(Mutex::new(receiver)),
        },
    )
}
