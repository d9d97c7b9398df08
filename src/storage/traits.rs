//! Storage traits and error types

use crate::archive::ArchiveLocator;
use crate::state::DocStatus;
use crate::storage::{CorpusStats, DocumentRecord, DocumentSummary, ReserveOutcome};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during metadata store operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    DocumentNotFound(i64),

    #[error("Document {doc_id} has no archive locator")]
    MissingLocator { doc_id: i64 },

    #[error("Invalid state transition for document {doc_id}: row was not in a state permitting {to}")]
    InvalidTransition { doc_id: i64, to: DocStatus },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for metadata store operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for metadata store implementations
///
/// Each call is a single transaction; readers may tolerate stale reads.
pub trait MetadataStore {
    /// Reserves a URL for crawling
    ///
    /// Inserts `(url, status = processing)` and returns the assigned id.
    /// On a unique-constraint conflict nothing is mutated and `Duplicate`
    /// is returned. The insert-or-nothing must be a single atomic
    /// statement: concurrent reservations of one URL yield exactly one
    /// `Reserved` and N-1 `Duplicate`s.
    fn reserve(&mut self, url: &str) -> StorageResult<ReserveOutcome>;

    /// Transitions `processing -> crawled` and records the archive locator
    /// plus the body's content hash
    fn mark_crawled(
        &mut self,
        doc_id: i64,
        locator: &ArchiveLocator,
        content_hash: &str,
    ) -> StorageResult<()>;

    /// Transitions `processing -> error`
    fn mark_failed(&mut self, doc_id: i64) -> StorageResult<()>;

    /// Transitions `crawled -> crawled_not_queued` (index enqueue failed)
    fn mark_not_queued(&mut self, doc_id: i64) -> StorageResult<()>;

    /// Fetches the archive locator for a crawled document
    fn fetch_locator(&self, doc_id: i64) -> StorageResult<ArchiveLocator>;

    /// Records the document's token count (pre-deduplication)
    fn set_doc_length(&mut self, doc_id: i64, doc_length: u64) -> StorageResult<()>;

    /// Records the document's extracted title
    fn set_title(&mut self, doc_id: i64, title: &str) -> StorageResult<()>;

    /// Gets a document by id
    fn get_document(&self, doc_id: i64) -> StorageResult<DocumentRecord>;

    /// Fetches (url, title, locator) summaries for a set of ids in one query
    fn get_summaries(&self, doc_ids: &[i64]) -> StorageResult<Vec<DocumentSummary>>;

    /// Fetches doc_length for a set of ids in one query
    fn get_doc_lengths(&self, doc_ids: &[i64]) -> StorageResult<HashMap<i64, u64>>;

    /// Corpus totals used by the scorer
    fn corpus_stats(&self) -> StorageResult<CorpusStats>;

    /// Counts documents per status
    fn count_by_status(&self) -> StorageResult<HashMap<DocStatus, u64>>;

    /// Total number of document rows
    fn count_documents(&self) -> StorageResult<u64>;
}
