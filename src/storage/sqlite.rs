//! SQLite metadata store implementation

use crate::archive::ArchiveLocator;
use crate::state::DocStatus;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{MetadataStore, StorageError, StorageResult};
use crate::storage::{CorpusStats, DocumentRecord, DocumentSummary, ReserveOutcome};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

/// SQLite metadata store backend
pub struct SqliteMetadataStore {
    conn: Connection,
}

impl SqliteMetadataStore {
    /// Opens (or creates) a metadata database at the given path
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory store (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<DocumentRecord> {
        let status_str: String = row.get(2)?;
        let file_path: Option<String> = row.get(4)?;
        let offset: Option<i64> = row.get(5)?;
        let length: Option<i64> = row.get(6)?;

        let locator = match (file_path, offset, length) {
            (Some(file), Some(offset), Some(length)) => Some(ArchiveLocator {
                file,
                offset: offset as u64,
                length: length as u64,
            }),
            _ => None,
        };

        Ok(DocumentRecord {
            id: row.get(0)?,
            url: row.get(1)?,
            status: DocStatus::from_db_string(&status_str).unwrap_or(DocStatus::Error),
            crawled_at: row.get(3)?,
            locator,
            content_hash: row.get(7)?,
            title: row.get(8)?,
            doc_length: row.get::<_, Option<i64>>(9)?.map(|n| n as u64),
        })
    }

    /// Moves a document to `to`, guarded by the status lifecycle
    fn set_status(&mut self, doc_id: i64, to: DocStatus) -> StorageResult<()> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE documents SET status = ?1 WHERE id = ?2 AND status IN ({})",
                transition_guard(to)
            ),
            params![to.to_db_string(), doc_id],
        )?;

        if changed == 0 {
            return Err(StorageError::InvalidTransition { doc_id, to });
        }
        Ok(())
    }
}

const SELECT_COLUMNS: &str =
    "id, url, status, crawled_at, file_path, offset, length, content_hash, title, doc_length";

/// SQL fragment listing the statuses allowed to move into `to`
///
/// Derived from the `DocStatus` transition predicate so the lifecycle has a
/// single definition; the guard makes an `UPDATE` from any other state a
/// no-op, which the callers report as an invalid transition.
fn transition_guard(to: DocStatus) -> String {
    to.valid_sources()
        .iter()
        .map(|status| format!("'{}'", status.to_db_string()))
        .collect::<Vec<_>>()
        .join(", ")
}

impl MetadataStore for SqliteMetadataStore {
    fn reserve(&mut self, url: &str) -> StorageResult<ReserveOutcome> {
        // Single conflict-handling insert: atomicity rides on the unique
        // index, not on a separate existence check.
        let changed = self.conn.execute(
            "INSERT INTO documents (url, status) VALUES (?1, ?2) ON CONFLICT(url) DO NOTHING",
            params![url, DocStatus::Processing.to_db_string()],
        )?;

        if changed == 0 {
            Ok(ReserveOutcome::Duplicate)
        } else {
            Ok(ReserveOutcome::Reserved(self.conn.last_insert_rowid()))
        }
    }

    fn mark_crawled(
        &mut self,
        doc_id: i64,
        locator: &ArchiveLocator,
        content_hash: &str,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            &format!(
                "UPDATE documents
                 SET status = ?1, crawled_at = ?2, file_path = ?3, offset = ?4, length = ?5,
                     content_hash = ?6
                 WHERE id = ?7 AND status IN ({})",
                transition_guard(DocStatus::Crawled)
            ),
            params![
                DocStatus::Crawled.to_db_string(),
                now,
                locator.file,
                locator.offset as i64,
                locator.length as i64,
                content_hash,
                doc_id,
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::InvalidTransition {
                doc_id,
                to: DocStatus::Crawled,
            });
        }
        Ok(())
    }

    fn mark_failed(&mut self, doc_id: i64) -> StorageResult<()> {
        self.set_status(doc_id, DocStatus::Error)
    }

    fn mark_not_queued(&mut self, doc_id: i64) -> StorageResult<()> {
        self.set_status(doc_id, DocStatus::CrawledNotQueued)
    }

    fn fetch_locator(&self, doc_id: i64) -> StorageResult<ArchiveLocator> {
        let row: Option<(Option<String>, Option<i64>, Option<i64>)> = self
            .conn
            .query_row(
                "SELECT file_path, offset, length FROM documents WHERE id = ?1",
                params![doc_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        match row {
            None => Err(StorageError::DocumentNotFound(doc_id)),
            Some((Some(file), Some(offset), Some(length))) => Ok(ArchiveLocator {
                file,
                offset: offset as u64,
                length: length as u64,
            }),
            Some(_) => Err(StorageError::MissingLocator { doc_id }),
        }
    }

    fn set_doc_length(&mut self, doc_id: i64, doc_length: u64) -> StorageResult<()> {
        let changed = self.conn.execute(
            "UPDATE documents SET doc_length = ?1 WHERE id = ?2",
            params![doc_length as i64, doc_id],
        )?;

        if changed == 0 {
            return Err(StorageError::DocumentNotFound(doc_id));
        }
        Ok(())
    }

    fn set_title(&mut self, doc_id: i64, title: &str) -> StorageResult<()> {
        let changed = self.conn.execute(
            "UPDATE documents SET title = ?1 WHERE id = ?2",
            params![title, doc_id],
        )?;

        if changed == 0 {
            return Err(StorageError::DocumentNotFound(doc_id));
        }
        Ok(())
    }

    fn get_document(&self, doc_id: i64) -> StorageResult<DocumentRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM documents WHERE id = ?1", SELECT_COLUMNS),
                params![doc_id],
                Self::row_to_record,
            )
            .optional()?
            .ok_or(StorageError::DocumentNotFound(doc_id))
    }

    fn get_summaries(&self, doc_ids: &[i64]) -> StorageResult<Vec<DocumentSummary>> {
        if doc_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; doc_ids.len()].join(",");
        let sql = format!(
            "SELECT id, url, title, file_path, offset, length FROM documents WHERE id IN ({})",
            placeholders
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(doc_ids.iter()), |row| {
            let file_path: Option<String> = row.get(3)?;
            let offset: Option<i64> = row.get(4)?;
            let length: Option<i64> = row.get(5)?;
            let locator = match (file_path, offset, length) {
                (Some(file), Some(offset), Some(length)) => Some(ArchiveLocator {
                    file,
                    offset: offset as u64,
                    length: length as u64,
                }),
                _ => None,
            };
            Ok(DocumentSummary {
                id: row.get(0)?,
                url: row.get(1)?,
                title: row.get(2)?,
                locator,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn get_doc_lengths(&self, doc_ids: &[i64]) -> StorageResult<HashMap<i64, u64>> {
        if doc_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders = vec!["?"; doc_ids.len()].join(",");
        let sql = format!(
            "SELECT id, doc_length FROM documents WHERE id IN ({}) AND doc_length IS NOT NULL",
            placeholders
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(doc_ids.iter()), |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)? as u64))
        })?;

        let mut lengths = HashMap::new();
        for row in rows {
            let (id, len) = row?;
            lengths.insert(id, len);
        }
        Ok(lengths)
    }

    fn corpus_stats(&self) -> StorageResult<CorpusStats> {
        let (total_docs, avg): (i64, Option<f64>) = self.conn.query_row(
            "SELECT COUNT(*), AVG(doc_length) FROM documents",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(CorpusStats {
            total_docs: total_docs as u64,
            avg_doc_length: match avg {
                Some(a) if a > 0.0 => a,
                _ => CorpusStats::DEFAULT_AVGDL,
            },
        })
    }

    fn count_by_status(&self) -> StorageResult<HashMap<DocStatus, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM documents GROUP BY status")?;

        let mut counts = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        for row in rows {
            let (status_str, count) = row?;
            if let Some(status) = DocStatus::from_db_string(&status_str) {
                counts.insert(status, count as u64);
            }
        }
        Ok(counts)
    }

    fn count_documents(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
