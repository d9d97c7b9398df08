//! Durable job queues and the query result cache
//!
//! Two FIFO lists drive the pipeline: `crawl_queue` carries URLs to fetch,
//! `indexing_queue` carries document ids awaiting indexing. Delivery is
//! at-least-once with no ack protocol: a worker that crashes after popping
//! loses that job, which is acceptable because the document row keeps its
//! `processing` status and shows up as a stuck row. The optional cache maps
//! normalized queries to serialized ranked results with per-row expiry.

mod sqlite;

pub use sqlite::SqliteQueue;

use thiserror::Error;

/// Errors that can occur during queue operations
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// Trait for job queue implementations
///
/// Push/pop must be atomic; pops take from the head, pushes append at the
/// tail.
pub trait JobQueue {
    /// Appends a URL to the crawl queue
    fn push_crawl(&mut self, url: &str) -> QueueResult<()>;

    /// Removes and returns the URL at the head of the crawl queue
    fn pop_crawl(&mut self) -> QueueResult<Option<String>>;

    /// Number of URLs waiting in the crawl queue
    fn crawl_len(&self) -> QueueResult<u64>;

    /// Appends a document id to the indexing queue
    fn push_index(&mut self, doc_id: i64) -> QueueResult<()>;

    /// Removes and returns the document id at the head of the indexing queue
    fn pop_index(&mut self) -> QueueResult<Option<i64>>;

    /// Number of jobs waiting in the indexing queue
    fn index_len(&self) -> QueueResult<u64>;

    /// Looks up a cached result list for a normalized query
    ///
    /// Expired entries are treated as absent.
    fn cache_get(&mut self, query: &str) -> QueueResult<Option<String>>;

    /// Stores a result list for a normalized query with a time-to-live
    fn cache_put(&mut self, query: &str, results: &str, ttl_secs: u64) -> QueueResult<()>;
}
