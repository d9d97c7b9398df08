//! Database schema definitions
//!
//! This module contains the SQL schema for the document metadata database.

/// SQL schema for the metadata database
pub const SCHEMA_SQL: &str = r#"
-- One row per discovered document
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    status TEXT NOT NULL DEFAULT 'pending',
    crawled_at TEXT,
    file_path TEXT,
    offset INTEGER,
    length INTEGER,
    content_hash TEXT,
    title TEXT,
    doc_length INTEGER
);

CREATE INDEX IF NOT EXISTS idx_documents_url ON documents(url);
CREATE INDEX IF NOT EXISTS idx_documents_status ON documents(status);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
