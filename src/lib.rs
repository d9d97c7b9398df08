//! Kumo: a queue-driven crawl, index, and search pipeline
//!
//! This crate implements a small search engine as a set of cooperating
//! workers sharing durable stores:
//!
//! - a crawler that fetches pages and appends them to an archive of
//!   gzip-compressed WARC records, recording each record's byte locator
//!   in a metadata store,
//! - an indexer that reads archived records back by locator, extracts and
//!   tokenizes visible text, and maintains an inverted index,
//! - a ranking HTTP service that scores candidate documents for a query
//!   and returns ranked results with snippets.

pub mod archive;
pub mod config;
pub mod crawler;
pub mod index;
pub mod indexer;
pub mod output;
pub mod queue;
pub mod ranker;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Kumo operations
#[derive(Debug, Error)]
pub enum KumoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Archive error: {0}")]
    Archive(#[from] archive::ArchiveError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Queue error: {0}")]
    Queue(#[from] queue::QueueError),

    #[error("Index error: {0}")]
    Index(#[from] index::IndexError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Store unavailable after {attempts} attempts: {message}")]
    StoreUnavailable { attempts: u32, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Kumo operations
pub type Result<T> = std::result::Result<T, KumoError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use queue::{JobQueue, SqliteQueue};
pub use state::DocStatus;
pub use storage::{MetadataStore, SqliteMetadataStore};
