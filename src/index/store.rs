//! redb-backed index store
//!
//! All posting updates for one document run inside a single write
//! transaction. redb serializes write transactions, which gives the
//! read-modify-write cycle the per-key serialization it needs under
//! multiple writers, and makes a failed document update atomic: either
//! every term sees the new doc id or none do.

use crate::index::postings::{encode_postings, parse_postings};
use crate::index::IndexResult;
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::collections::BTreeSet;
use std::path::Path;

const POSTINGS: TableDefinition<&str, &str> = TableDefinition::new("postings");

/// Persistent term -> posting-list store
pub struct IndexStore {
    db: Database,
}

impl IndexStore {
    /// Opens (or creates) an index database at the given path
    pub fn open(path: &Path) -> IndexResult<Self> {
        let db = Database::create(path)?;

        // Ensure the table exists so fresh databases are readable
        let tx = db.begin_write()?;
        tx.open_table(POSTINGS)?;
        tx.commit()?;

        Ok(Self { db })
    }

    /// Adds a document to the posting list of every given term
    ///
    /// Terms whose lists already contain the id are left untouched, so
    /// re-indexing a document is a no-op.
    ///
    /// # Arguments
    ///
    /// * `doc_id` - The document id to add
    /// * `terms` - The document's unique terms
    pub fn add_document(&self, doc_id: i64, terms: &BTreeSet<String>) -> IndexResult<()> {
        let tx = self.db.begin_write()?;
        {
            let mut table = tx.open_table(POSTINGS)?;
            for term in terms {
                let existing = table
                    .get(term.as_str())?
                    .map(|guard| guard.value().to_string());

                let mut doc_ids = match &existing {
                    Some(encoded) => parse_postings(encoded),
                    None => BTreeSet::new(),
                };

                if doc_ids.insert(doc_id) {
                    let encoded = encode_postings(&doc_ids);
                    table.insert(term.as_str(), encoded.as_str())?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Returns the posting list for a term; missing terms are empty
    pub fn get_postings(&self, term: &str) -> IndexResult<BTreeSet<i64>> {
        let tx = self.db.begin_read()?;
        let table = tx.open_table(POSTINGS)?;

        Ok(match table.get(term)? {
            Some(guard) => parse_postings(guard.value()),
            None => BTreeSet::new(),
        })
    }

    /// Returns the raw encoded posting list for a term, if present
    pub fn get_raw(&self, term: &str) -> IndexResult<Option<String>> {
        let tx = self.db.begin_read()?;
        let table = tx.open_table(POSTINGS)?;
        Ok(table.get(term)?.map(|guard| guard.value().to_string()))
    }

    /// Number of distinct terms in the index
    pub fn term_count(&self) -> IndexResult<u64> {
        let tx = self.db.begin_read()?;
        let table = tx.open_table(POSTINGS)?;
        Ok(table.len()?)
    }
}
