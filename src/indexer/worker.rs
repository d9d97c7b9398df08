//! Indexer worker loop

use crate::archive::{decompress_record, read_slice};
use crate::config::IndexerConfig;
use crate::index::IndexStore;
use crate::indexer::text::{extract_text, extract_title};
use crate::indexer::tokenizer::tokenize;
use crate::queue::JobQueue;
use crate::storage::MetadataStore;
use crate::Result;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

/// The indexer worker
///
/// One worker per index instance is the safe default: posting-list updates
/// are read-modify-write cycles, serialized here by the index store's write
/// transactions.
pub struct IndexerWorker<S: MetadataStore, Q: JobQueue> {
    store: S,
    queue: Q,
    index: IndexStore,
    archive_dir: PathBuf,
    config: IndexerConfig,
}

impl<S: MetadataStore, Q: JobQueue> IndexerWorker<S, Q> {
    pub fn new(
        store: S,
        queue: Q,
        index: IndexStore,
        archive_dir: PathBuf,
        config: IndexerConfig,
    ) -> Self {
        Self {
            store,
            queue,
            index,
            archive_dir,
            config,
        }
    }

    /// Runs the indexing loop until a queue error stops it
    ///
    /// Any failure on a single document is logged and the loop advances to
    /// the next job; there is no retry queue.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let doc_id = self.pop_blocking().await?;

            match self.index_document(doc_id) {
                Ok(token_count) => {
                    tracing::info!("Indexed {} tokens for doc {}", token_count, doc_id);
                }
                Err(e) => {
                    tracing::warn!("Skipping doc {}: {}", doc_id, e);
                }
            }
        }
    }

    /// Waits indefinitely for the next indexing job
    async fn pop_blocking(&mut self) -> Result<i64> {
        loop {
            if let Some(doc_id) = self.queue.pop_index()? {
                return Ok(doc_id);
            }
            tokio::time::sleep(Duration::from_millis(self.config.queue_poll_ms)).await;
        }
    }

    /// Indexes one archived document
    ///
    /// # Arguments
    ///
    /// * `doc_id` - The document to index
    ///
    /// # Returns
    ///
    /// The document's token count (pre-deduplication), which is also written
    /// to the metadata store as `doc_length`
    pub fn index_document(&mut self, doc_id: i64) -> Result<usize> {
        let locator = self.store.fetch_locator(doc_id)?;
        let path = self.archive_dir.join(&locator.file);

        let slice = read_slice(&path, locator.offset, locator.length)?;
        let record = decompress_record(&slice, self.config.max_decompressed_bytes)?;

        let html = String::from_utf8_lossy(record.payload());
        let text = extract_text(&html);
        let tokens = tokenize(&text);

        let unique: BTreeSet<String> = tokens.iter().cloned().collect();
        self.index.add_document(doc_id, &unique)?;

        if let Some(title) = extract_title(&html) {
            self.store.set_title(doc_id, &title)?;
        }
        self.store.set_doc_length(doc_id, tokens.len() as u64)?;

        Ok(tokens.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{ArchiveLocator, ArchiveWriter};
    use crate::queue::SqliteQueue;
    use crate::storage::{ReserveOutcome, SqliteMetadataStore};
    use tempfile::TempDir;

    const ARCHIVE_FILE: &str = "archive-00001.warc.gz";

    struct Fixture {
        dir: TempDir,
        worker: IndexerWorker<SqliteMetadataStore, SqliteQueue>,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let store = SqliteMetadataStore::open_in_memory().unwrap();
        let queue = SqliteQueue::open_in_memory().unwrap();
        let index = IndexStore::open(&dir.path().join("index.redb")).unwrap();
        let worker = IndexerWorker::new(
            store,
            queue,
            index,
            dir.path().to_path_buf(),
            IndexerConfig::default(),
        );
        Fixture { dir, worker }
    }

    /// Archives a body for `url` and records it as crawled; returns the doc id
    fn archive_document(fixture: &mut Fixture, url: &str, body: &str) -> i64 {
        let writer = ArchiveWriter::open(&fixture.dir.path().join(ARCHIVE_FILE)).unwrap();
        let (offset, length) = writer.write_record(url, body.as_bytes()).unwrap();

        let doc_id = match fixture.worker.store.reserve(url).unwrap() {
            ReserveOutcome::Reserved(id) => id,
            ReserveOutcome::Duplicate => panic!("URL already reserved"),
        };
        let locator = ArchiveLocator {
            file: ARCHIVE_FILE.to_string(),
            offset,
            length,
        };
        fixture.worker.store.mark_crawled(doc_id, &locator, "hash").unwrap();
        doc_id
    }

    #[test]
    fn test_index_document_happy_path() {
        let mut fixture = fixture();
        let doc_id = archive_document(
            &mut fixture,
            "https://example.test/a",
            "<html><title>T</title><body>hello world hello</body></html>",
        );

        let count = fixture.worker.index_document(doc_id).unwrap();
        assert_eq!(count, 3);

        let doc = fixture.worker.store.get_document(doc_id).unwrap();
        assert_eq!(doc.doc_length, Some(3));
        assert_eq!(doc.title.as_deref(), Some("T"));

        let hello: Vec<i64> = fixture.worker.index.get_postings("hello").unwrap().into_iter().collect();
        let world: Vec<i64> = fixture.worker.index.get_postings("world").unwrap().into_iter().collect();
        assert_eq!(hello, vec![doc_id]);
        assert_eq!(world, vec![doc_id]);
    }

    #[test]
    fn test_index_document_idempotent() {
        let mut fixture = fixture();
        let doc_id = archive_document(
            &mut fixture,
            "https://example.test/a",
            "<html><body>alpha beta alpha</body></html>",
        );

        let first = fixture.worker.index_document(doc_id).unwrap();
        let second = fixture.worker.index_document(doc_id).unwrap();
        assert_eq!(first, second);

        let doc = fixture.worker.store.get_document(doc_id).unwrap();
        assert_eq!(doc.doc_length, Some(first as u64));
        assert_eq!(
            fixture.worker.index.get_raw("alpha").unwrap().as_deref(),
            Some(doc_id.to_string().as_str())
        );
    }

    #[test]
    fn test_script_and_style_not_indexed() {
        let mut fixture = fixture();
        let doc_id = archive_document(
            &mut fixture,
            "https://example.test/a",
            r#"<html><head><style>invisible { color: red }</style></head>
               <body>visible<script>var secretword = 1;</script></body></html>"#,
        );

        fixture.worker.index_document(doc_id).unwrap();
        assert!(!fixture.worker.index.get_postings("visible").unwrap().is_empty());
        assert!(fixture.worker.index.get_postings("secretword").unwrap().is_empty());
        assert!(fixture.worker.index.get_postings("invisible").unwrap().is_empty());
    }

    #[test]
    fn test_missing_locator_skips() {
        let mut fixture = fixture();
        fixture.worker.store.reserve("https://example.test/pending").unwrap();

        // Still processing, no locator yet
        assert!(fixture.worker.index_document(1).is_err());
    }

    #[test]
    fn test_oversize_document_skipped_without_partial_entries() {
        let mut fixture = fixture();
        let big_body = format!(
            "<html><body>{}</body></html>",
            "sprawling ".repeat(2000)
        );
        let doc_id = archive_document(&mut fixture, "https://example.test/big", &big_body);

        fixture.worker.config.max_decompressed_bytes = 256;
        assert!(fixture.worker.index_document(doc_id).is_err());

        // No partial index entries and no doc_length
        assert!(fixture.worker.index.get_postings("sprawling").unwrap().is_empty());
        assert_eq!(
            fixture.worker.store.get_document(doc_id).unwrap().doc_length,
            None
        );
    }

    #[test]
    fn test_corrupt_slice_skipped() {
        let mut fixture = fixture();

        // Write raw garbage and register a locator pointing at it
        let path = fixture.dir.path().join(ARCHIVE_FILE);
        std::fs::write(&path, b"not gzip at all").unwrap();

        let doc_id = match fixture.worker.store.reserve("https://example.test/corrupt").unwrap() {
            ReserveOutcome::Reserved(id) => id,
            ReserveOutcome::Duplicate => unreachable!(),
        };
        let locator = ArchiveLocator {
            file: ARCHIVE_FILE.to_string(),
            offset: 0,
            length: 15,
        };
        fixture.worker.store.mark_crawled(doc_id, &locator, "hash").unwrap();

        assert!(fixture.worker.index_document(doc_id).is_err());
    }
}
