//! Crawler worker loop

use crate::archive::{ArchiveLocator, ArchiveWriter};
use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{fetch_url, FetchOutcome};
use crate::crawler::parser::extract_links;
use crate::queue::JobQueue;
use crate::storage::{MetadataStore, ReserveOutcome};
use crate::url::is_valid_crawl_url;
use crate::Result;
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Delay between attempts to enqueue an indexing job
const ENQUEUE_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Outcome of a single crawl iteration
#[derive(Debug)]
pub enum CrawlOutcome {
    /// The crawl queue was empty
    QueueEmpty,
    /// The popped string was not a crawlable URL and was discarded
    InvalidUrl(String),
    /// The URL already has a document row
    Duplicate(String),
    /// Fetch or archive write failed; the document was marked as error
    Failed { doc_id: i64 },
    /// The document was archived and its index job enqueued
    Crawled { doc_id: i64 },
    /// The document was archived but the index enqueue exhausted its retries
    NotQueued { doc_id: i64 },
}

/// The crawler worker
///
/// Internally single-threaded; parallelism comes from running multiple
/// worker processes against the shared queue and stores.
pub struct CrawlerWorker<S: MetadataStore, Q: JobQueue> {
    store: S,
    queue: Q,
    archive: ArchiveWriter,
    client: Client,
    config: CrawlerConfig,
}

impl<S: MetadataStore, Q: JobQueue> CrawlerWorker<S, Q> {
    pub fn new(
        store: S,
        queue: Q,
        archive: ArchiveWriter,
        client: Client,
        config: CrawlerConfig,
    ) -> Self {
        Self {
            store,
            queue,
            archive,
            client,
            config,
        }
    }

    /// Pushes the configured seed URL if the crawl queue is empty
    ///
    /// # Returns
    ///
    /// `true` if the seed was pushed
    pub fn seed_if_empty(&mut self) -> Result<bool> {
        if self.queue.crawl_len()? == 0 {
            tracing::info!("Crawl queue empty, seeding: {}", self.config.seed_url);
            let seed = self.config.seed_url.clone();
            self.queue.push_crawl(&seed)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Runs the crawl loop until a store or queue error stops it
    ///
    /// Per-document failures (bad URL, fetch error, enqueue exhaustion) are
    /// absorbed; only infrastructure errors propagate.
    pub async fn run(&mut self) -> Result<()> {
        self.seed_if_empty()?;

        loop {
            match self.step().await? {
                CrawlOutcome::QueueEmpty => {
                    tokio::time::sleep(Duration::from_millis(self.config.queue_poll_ms)).await;
                }
                CrawlOutcome::Crawled { .. } | CrawlOutcome::NotQueued { .. } => {
                    // Global politeness throttle
                    tokio::time::sleep(Duration::from_millis(self.config.crawl_delay_ms)).await;
                }
                _ => {}
            }
        }
    }

    /// Performs one crawl iteration
    pub async fn step(&mut self) -> Result<CrawlOutcome> {
        let url = match self.queue.pop_crawl()? {
            Some(url) => url,
            None => return Ok(CrawlOutcome::QueueEmpty),
        };

        if !is_valid_crawl_url(&url) {
            tracing::warn!("Discarding invalid URL: {}", url);
            return Ok(CrawlOutcome::InvalidUrl(url));
        }

        let doc_id = match self.store.reserve(&url)? {
            ReserveOutcome::Reserved(id) => id,
            ReserveOutcome::Duplicate => {
                tracing::debug!("Skipping duplicate: {}", url);
                return Ok(CrawlOutcome::Duplicate(url));
            }
        };

        tracing::info!("Fetching: {} (doc {})", url, doc_id);
        let body = match fetch_url(&self.client, &url).await {
            FetchOutcome::Success { body, .. } => body,
            FetchOutcome::HttpError { status_code } => {
                tracing::warn!("Fetch of {} failed with HTTP {}", url, status_code);
                self.store.mark_failed(doc_id)?;
                return Ok(CrawlOutcome::Failed { doc_id });
            }
            FetchOutcome::EmptyBody => {
                tracing::warn!("Fetch of {} returned an empty body", url);
                self.store.mark_failed(doc_id)?;
                return Ok(CrawlOutcome::Failed { doc_id });
            }
            FetchOutcome::NetworkError { error } => {
                tracing::warn!("Fetch of {} failed: {}", url, error);
                self.store.mark_failed(doc_id)?;
                return Ok(CrawlOutcome::Failed { doc_id });
            }
        };

        let (offset, length) = match self.archive.write_record(&url, &body) {
            Ok(locator) => locator,
            Err(e) => {
                tracing::error!("Archive write for doc {} failed: {}", doc_id, e);
                self.store.mark_failed(doc_id)?;
                return Ok(CrawlOutcome::Failed { doc_id });
            }
        };

        let locator = ArchiveLocator {
            file: self.archive.file_name(),
            offset,
            length,
        };
        let content_hash = hex::encode(Sha256::digest(&body));
        self.store.mark_crawled(doc_id, &locator, &content_hash)?;
        tracing::info!(
            "Archived doc {} at {}+{} ({} bytes compressed)",
            doc_id,
            locator.offset,
            locator.length,
            locator.length
        );

        if self.config.follow_links {
            self.push_discovered_links(&url, &body);
        }

        if self.enqueue_with_retry(doc_id).await {
            Ok(CrawlOutcome::Crawled { doc_id })
        } else {
            tracing::error!("Index enqueue for doc {} exhausted retries", doc_id);
            self.store.mark_not_queued(doc_id)?;
            Ok(CrawlOutcome::NotQueued { doc_id })
        }
    }

    /// Attempts to enqueue the index job, retrying a bounded number of times
    async fn enqueue_with_retry(&mut self, doc_id: i64) -> bool {
        for attempt in 0..self.config.enqueue_retries {
            match self.queue.push_index(doc_id) {
                Ok(()) => return true,
                Err(e) => {
                    tracing::warn!(
                        "Index enqueue attempt {} for doc {} failed: {}",
                        attempt + 1,
                        doc_id,
                        e
                    );
                    tokio::time::sleep(ENQUEUE_RETRY_DELAY).await;
                }
            }
        }
        false
    }

    /// Pushes valid outlinks from a fetched page onto the crawl queue
    fn push_discovered_links(&mut self, page_url: &str, body: &[u8]) {
        let base = match url::Url::parse(page_url) {
            Ok(base) => base,
            Err(_) => return,
        };

        let html = String::from_utf8_lossy(body);
        for link in extract_links(&html, &base) {
            if !is_valid_crawl_url(&link) {
                continue;
            }
            if let Err(e) = self.queue.push_crawl(&link) {
                tracing::warn!("Failed to queue discovered link {}: {}", link, e);
            }
        }
    }
}
