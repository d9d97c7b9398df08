//! SQLite-backed queue implementation
//!
//! FIFO order comes from the AUTOINCREMENT rowid: push inserts at the tail,
//! pop selects the minimum id and deletes it in one transaction.

use crate::queue::{JobQueue, QueueResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const QUEUE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS crawl_queue (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS indexing_queue (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    doc_id INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS query_cache (
    query TEXT PRIMARY KEY,
    results TEXT NOT NULL,
    expires_at INTEGER NOT NULL
);
"#;

/// SQLite queue backend
pub struct SqliteQueue {
    conn: Connection,
}

impl SqliteQueue {
    /// Opens (or creates) a queue database at the given path
    pub fn open(path: &Path) -> QueueResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
        ",
        )?;
        conn.execute_batch(QUEUE_SCHEMA)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory queue (for testing)
    pub fn open_in_memory() -> QueueResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(QUEUE_SCHEMA)?;
        Ok(Self { conn })
    }

    fn pop_head<T: rusqlite::types::FromSql>(
        &mut self,
        table: &str,
        column: &str,
    ) -> QueueResult<Option<T>> {
        let tx = self.conn.transaction()?;

        let head: Option<(i64, T)> = tx
            .query_row(
                &format!("SELECT id, {} FROM {} ORDER BY id LIMIT 1", column, table),
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let value = match head {
            Some((id, value)) => {
                tx.execute(&format!("DELETE FROM {} WHERE id = ?1", table), params![id])?;
                Some(value)
            }
            None => None,
        };

        tx.commit()?;
        Ok(value)
    }

    fn table_len(&self, table: &str) -> QueueResult<u64> {
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
        Ok(count as u64)
    }
}

impl JobQueue for SqliteQueue {
    fn push_crawl(&mut self, url: &str) -> QueueResult<()> {
        self.conn
            .execute("INSERT INTO crawl_queue (url) VALUES (?1)", params![url])?;
        Ok(())
    }

    fn pop_crawl(&mut self) -> QueueResult<Option<String>> {
        self.pop_head("crawl_queue", "url")
    }

    fn crawl_len(&self) -> QueueResult<u64> {
        self.table_len("crawl_queue")
    }

    fn push_index(&mut self, doc_id: i64) -> QueueResult<()> {
        self.conn.execute(
            "INSERT INTO indexing_queue (doc_id) VALUES (?1)",
            params![doc_id],
        )?;
        Ok(())
    }

    fn pop_index(&mut self) -> QueueResult<Option<i64>> {
        self.pop_head("indexing_queue", "doc_id")
    }

    fn index_len(&self) -> QueueResult<u64> {
        self.table_len("indexing_queue")
    }

    fn cache_get(&mut self, query: &str) -> QueueResult<Option<String>> {
        let now = Utc::now().timestamp();
        self.conn.execute(
            "DELETE FROM query_cache WHERE expires_at <= ?1",
            params![now],
        )?;

        Ok(self
            .conn
            .query_row(
                "SELECT results FROM query_cache WHERE query = ?1",
                params![query],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn cache_put(&mut self, query: &str, results: &str, ttl_secs: u64) -> QueueResult<()> {
        let expires_at = Utc::now().timestamp() + ttl_secs as i64;
        self.conn.execute(
            "INSERT OR REPLACE INTO query_cache (query, results, expires_at) VALUES (?1, ?2, ?3)",
            params![query, results, expires_at],
        )?;
        Ok(())
    }
}
