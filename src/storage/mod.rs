//! Metadata store for the document table
//!
//! This module persists one row per discovered document: canonical URL,
//! lifecycle status, archive locator, and token count. The unique index on
//! `url` is what makes `reserve` safe under concurrency, and all status
//! transitions are guarded so the lifecycle stays monotonic.

mod schema;
mod sqlite;
mod traits;

pub use schema::initialize_schema;
pub use sqlite::SqliteMetadataStore;
pub use traits::{MetadataStore, StorageError, StorageResult};

use crate::archive::ArchiveLocator;
use crate::state::DocStatus;

/// Outcome of reserving a URL for crawling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// A fresh row was created with this document id
    Reserved(i64),
    /// The URL already has a row; nothing was mutated
    Duplicate,
}

/// Represents a document row
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub id: i64,
    pub url: String,
    pub status: DocStatus,
    pub crawled_at: Option<String>,
    pub locator: Option<ArchiveLocator>,
    pub content_hash: Option<String>,
    pub title: Option<String>,
    pub doc_length: Option<u64>,
}

/// The (url, title) pair the ranker joins onto scored results
#[derive(Debug, Clone)]
pub struct DocumentSummary {
    pub id: i64,
    pub url: String,
    pub title: Option<String>,
    pub locator: Option<ArchiveLocator>,
}

/// Corpus-wide statistics used for scoring
#[derive(Debug, Clone, Copy)]
pub struct CorpusStats {
    /// Total number of document rows
    pub total_docs: u64,
    /// Mean doc_length over indexed documents; falls back to a neutral
    /// default when nothing is indexed yet
    pub avg_doc_length: f64,
}

impl CorpusStats {
    /// Default used before any document has a doc_length
    pub const DEFAULT_AVGDL: f64 = 100.0;
}
