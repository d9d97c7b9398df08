//! Persistent inverted index
//!
//! Maps terms to the set of document ids containing them. Values use the
//! wire encoding the rest of the deployment expects: ASCII comma-separated
//! decimal doc ids with no trailing delimiter. Writers are idempotent —
//! adding an id that is already present is a no-op.

mod postings;
mod store;

pub use postings::{encode_postings, parse_postings};
pub use store::IndexStore;

use thiserror::Error;

/// Errors that can occur during index operations
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Database creation error: {0}")]
    Create(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;
