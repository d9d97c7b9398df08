//! End-to-end pipeline tests
//!
//! These tests run the real components against wiremock HTTP servers and
//! scratch stores: crawl a page, index it, and query it back through the
//! ranking service.

use kumo::archive::{decompress_record, read_slice, ArchiveWriter};
use kumo::config::{CrawlerConfig, IndexerConfig, UserAgentConfig};
use kumo::crawler::{build_http_client, CrawlOutcome, CrawlerWorker};
use kumo::index::IndexStore;
use kumo::indexer::IndexerWorker;
use kumo::queue::{JobQueue, QueueError, SqliteQueue};
use kumo::ranker::{build_router, RankerEngine};
use kumo::state::DocStatus;
use kumo::storage::{MetadataStore, SqliteMetadataStore};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARCHIVE_FILE: &str = "archive-00001.warc.gz";

fn crawler_config(seed: &str) -> CrawlerConfig {
    CrawlerConfig {
        seed_url: seed.to_string(),
        crawl_delay_ms: 0,
        queue_poll_ms: 1,
        fetch_timeout_secs: 5,
        enqueue_retries: 3,
        store_connect_retries: 1,
        store_connect_backoff_secs: 0,
        follow_links: false,
    }
}

fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "KumoTest".to_string(),
        crawler_version: "0.1".to_string(),
        contact_url: "https://example.com/about".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

/// Shared scratch deployment: metadata, queue, index, and archive all live
/// under one temp directory, opened fresh by each component like separate
/// processes would.
struct Deployment {
    dir: TempDir,
}

impl Deployment {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn metadata_path(&self) -> PathBuf {
        self.dir.path().join("metadata.db")
    }

    fn queue_path(&self) -> PathBuf {
        self.dir.path().join("queue.db")
    }

    fn index_path(&self) -> PathBuf {
        self.dir.path().join("index.redb")
    }

    fn archive_dir(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    fn archive_path(&self) -> PathBuf {
        self.dir.path().join(ARCHIVE_FILE)
    }

    fn store(&self) -> SqliteMetadataStore {
        SqliteMetadataStore::open(&self.metadata_path()).unwrap()
    }

    fn queue(&self) -> SqliteQueue {
        SqliteQueue::open(&self.queue_path()).unwrap()
    }

    fn index(&self) -> IndexStore {
        IndexStore::open(&self.index_path()).unwrap()
    }

    fn crawler(&self, seed: &str) -> CrawlerWorker<SqliteMetadataStore, SqliteQueue> {
        let archive = ArchiveWriter::open(&self.archive_path()).unwrap();
        let client = build_http_client(&user_agent(), Duration::from_secs(5)).unwrap();
        CrawlerWorker::new(
            self.store(),
            self.queue(),
            archive,
            client,
            crawler_config(seed),
        )
    }

    fn indexer(&self) -> IndexerWorker<SqliteMetadataStore, SqliteQueue> {
        IndexerWorker::new(
            self.store(),
            self.queue(),
            self.index(),
            self.archive_dir(),
            IndexerConfig::default(),
        )
    }

    fn engine(&self) -> RankerEngine<SqliteMetadataStore, SqliteQueue> {
        RankerEngine::new(
            self.store(),
            self.queue(),
            self.index(),
            self.archive_dir(),
            10,
            false,
            60,
        )
    }
}

async fn mock_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

/// S1: seed one URL, run one crawl and one index cycle, check every store
#[tokio::test]
async fn single_document_crawl_and_index() {
    let server = MockServer::start().await;
    mock_page(
        &server,
        "/a",
        "<html><title>T</title><body>hello world hello</body></html>",
    )
    .await;

    let deployment = Deployment::new();
    let url = format!("{}/a", server.uri());

    let mut crawler = deployment.crawler(&url);
    crawler.seed_if_empty().unwrap();
    let doc_id = match crawler.step().await.unwrap() {
        CrawlOutcome::Crawled { doc_id } => doc_id,
        other => panic!("expected crawled, got {:?}", other),
    };

    let mut indexer = deployment.indexer();
    let job = deployment.queue().pop_index().unwrap();
    assert_eq!(job, Some(doc_id));
    indexer.index_document(doc_id).unwrap();
    drop(indexer);

    let store = deployment.store();
    let doc = store.get_document(doc_id).unwrap();
    assert_eq!(doc.url, url);
    assert_eq!(doc.status, DocStatus::Crawled);
    assert_eq!(doc.doc_length, Some(3));
    assert_eq!(doc.title.as_deref(), Some("T"));

    let index = deployment.index();
    assert_eq!(
        index.get_postings("hello").unwrap().into_iter().collect::<Vec<_>>(),
        vec![doc_id]
    );
    assert_eq!(
        index.get_postings("world").unwrap().into_iter().collect::<Vec<_>>(),
        vec![doc_id]
    );
}

/// S2: the same URL queued twice produces one row and one archive record
#[tokio::test]
async fn duplicate_url_crawled_once() {
    let server = MockServer::start().await;
    mock_page(&server, "/dup", "<html><body>once only</body></html>").await;

    let deployment = Deployment::new();
    let url = format!("{}/dup", server.uri());

    let mut crawler = deployment.crawler(&url);
    {
        let mut queue = deployment.queue();
        queue.push_crawl(&url).unwrap();
        queue.push_crawl(&url).unwrap();
    }

    assert!(matches!(
        crawler.step().await.unwrap(),
        CrawlOutcome::Crawled { .. }
    ));
    assert!(matches!(
        crawler.step().await.unwrap(),
        CrawlOutcome::Duplicate(_)
    ));

    let store = deployment.store();
    assert_eq!(store.count_documents().unwrap(), 1);

    // Exactly one record: the file ends where the first record's locator ends
    let doc = store.get_document(1).unwrap();
    let locator = doc.locator.unwrap();
    let archive_len = std::fs::metadata(deployment.archive_path()).unwrap().len();
    assert_eq!(archive_len, locator.offset + locator.length);
}

/// S3: query scoring over two documents, including deterministic ties
#[tokio::test]
async fn query_returns_ranked_results() {
    let server = MockServer::start().await;
    mock_page(&server, "/1", "<html><body>quick brown fox</body></html>").await;
    mock_page(&server, "/2", "<html><body>quick red fox</body></html>").await;

    let deployment = Deployment::new();
    let url1 = format!("{}/1", server.uri());
    let url2 = format!("{}/2", server.uri());

    let mut crawler = deployment.crawler(&url1);
    {
        let mut queue = deployment.queue();
        queue.push_crawl(&url1).unwrap();
        queue.push_crawl(&url2).unwrap();
    }
    let d1 = match crawler.step().await.unwrap() {
        CrawlOutcome::Crawled { doc_id } => doc_id,
        other => panic!("unexpected {:?}", other),
    };
    let d2 = match crawler.step().await.unwrap() {
        CrawlOutcome::Crawled { doc_id } => doc_id,
        other => panic!("unexpected {:?}", other),
    };

    let mut indexer = deployment.indexer();
    indexer.index_document(d1).unwrap();
    indexer.index_document(d2).unwrap();
    drop(indexer);

    let engine = deployment.engine();

    let outcome = engine.search("brown").unwrap();
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].id, d1);
    assert!(outcome.results[0].score > 0.0);

    let outcome = engine.search("fox").unwrap();
    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.results[0].id, d1);
    assert_eq!(outcome.results[1].id, d2);
}

/// A queue whose index side always fails, for exercising enqueue fallback
struct FailingIndexQueue {
    inner: SqliteQueue,
}

impl JobQueue for FailingIndexQueue {
    fn push_crawl(&mut self, url: &str) -> Result<(), QueueError> {
        self.inner.push_crawl(url)
    }

    fn pop_crawl(&mut self) -> Result<Option<String>, QueueError> {
        self.inner.pop_crawl()
    }

    fn crawl_len(&self) -> Result<u64, QueueError> {
        self.inner.crawl_len()
    }

    fn push_index(&mut self, _doc_id: i64) -> Result<(), QueueError> {
        Err(QueueError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "index queue unavailable",
        )))
    }

    fn pop_index(&mut self) -> Result<Option<i64>, QueueError> {
        self.inner.pop_index()
    }

    fn index_len(&self) -> Result<u64, QueueError> {
        self.inner.index_len()
    }

    fn cache_get(&mut self, query: &str) -> Result<Option<String>, QueueError> {
        self.inner.cache_get(query)
    }

    fn cache_put(&mut self, query: &str, results: &str, ttl: u64) -> Result<(), QueueError> {
        self.inner.cache_put(query, results, ttl)
    }
}

/// S4: a failing index enqueue leaves the document archived but flagged
#[tokio::test]
async fn failed_enqueue_marks_not_queued() {
    let server = MockServer::start().await;
    mock_page(&server, "/x", "<html><body>stranded page</body></html>").await;

    let deployment = Deployment::new();
    let url = format!("{}/x", server.uri());

    let mut queue = FailingIndexQueue {
        inner: deployment.queue(),
    };
    queue.push_crawl(&url).unwrap();

    let archive = ArchiveWriter::open(&deployment.archive_path()).unwrap();
    let client = build_http_client(&user_agent(), Duration::from_secs(5)).unwrap();
    let mut crawler = CrawlerWorker::new(
        deployment.store(),
        queue,
        archive,
        client,
        crawler_config(&url),
    );

    let outcome = crawler.step().await.unwrap();
    let doc_id = match outcome {
        CrawlOutcome::NotQueued { doc_id } => doc_id,
        other => panic!("expected not-queued, got {:?}", other),
    };

    let store = deployment.store();
    let doc = store.get_document(doc_id).unwrap();
    assert_eq!(doc.status, DocStatus::CrawledNotQueued);
    // The archive record exists and reads back
    let locator = doc.locator.unwrap();
    let slice = read_slice(&deployment.archive_path(), locator.offset, locator.length).unwrap();
    let record = decompress_record(&slice, 10 * 1024 * 1024).unwrap();
    assert_eq!(record.target_uri(), Some(url.as_str()));

    // No orphan index entries
    assert!(deployment
        .index()
        .get_postings("stranded")
        .unwrap()
        .is_empty());
}

/// S5: a middle record reads back exactly, uninfluenced by its neighbors
#[test]
fn random_access_reads_middle_record() {
    let deployment = Deployment::new();
    let writer = ArchiveWriter::open(&deployment.archive_path()).unwrap();

    writer.write_record("https://example.test/1", b"record one body").unwrap();
    let (offset, length) = writer
        .write_record("https://example.test/2", b"record two body")
        .unwrap();
    writer.write_record("https://example.test/3", b"record three body").unwrap();

    let slice = read_slice(&deployment.archive_path(), offset, length).unwrap();
    let record = decompress_record(&slice, 10 * 1024 * 1024).unwrap();
    assert_eq!(record.payload(), b"record two body");
    assert_eq!(record.target_uri(), Some("https://example.test/2"));
}

/// S6: an oversize record is skipped without partial index entries
#[tokio::test]
async fn oversize_record_skipped() {
    let server = MockServer::start().await;
    let big_body = format!(
        "<html><body>{}</body></html>",
        "gigantic page content ".repeat(500)
    );
    mock_page(&server, "/big", &big_body).await;

    let deployment = Deployment::new();
    let url = format!("{}/big", server.uri());

    let mut crawler = deployment.crawler(&url);
    deployment.queue().push_crawl(&url).unwrap();
    let doc_id = match crawler.step().await.unwrap() {
        CrawlOutcome::Crawled { doc_id } => doc_id,
        other => panic!("unexpected {:?}", other),
    };

    // An indexer with a tiny decompression cap must reject the record
    let mut indexer = IndexerWorker::new(
        deployment.store(),
        deployment.queue(),
        deployment.index(),
        deployment.archive_dir(),
        IndexerConfig {
            max_decompressed_bytes: 512,
            queue_poll_ms: 1,
        },
    );
    assert!(indexer.index_document(doc_id).is_err());
    drop(indexer);

    let store = deployment.store();
    assert_eq!(store.get_document(doc_id).unwrap().doc_length, None);
    assert!(deployment
        .index()
        .get_postings("gigantic")
        .unwrap()
        .is_empty());
}

/// Invariant 1: the archived record's target URI matches the stored URL
#[tokio::test]
async fn archived_record_matches_document_url() {
    let server = MockServer::start().await;
    mock_page(&server, "/match", "<html><body>match me</body></html>").await;

    let deployment = Deployment::new();
    let url = format!("{}/match", server.uri());

    let mut crawler = deployment.crawler(&url);
    deployment.queue().push_crawl(&url).unwrap();
    let doc_id = match crawler.step().await.unwrap() {
        CrawlOutcome::Crawled { doc_id } => doc_id,
        other => panic!("unexpected {:?}", other),
    };

    let store = deployment.store();
    let doc = store.get_document(doc_id).unwrap();
    let locator = doc.locator.unwrap();

    let slice = read_slice(&deployment.archive_path(), locator.offset, locator.length).unwrap();
    let record = decompress_record(&slice, 10 * 1024 * 1024).unwrap();
    assert_eq!(record.target_uri(), Some(doc.url.as_str()));
    assert!(String::from_utf8_lossy(record.payload()).contains("match me"));
}

/// The full pipeline probed through the HTTP surface
#[tokio::test]
async fn search_endpoint_end_to_end() {
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    let server = MockServer::start().await;
    mock_page(
        &server,
        "/page",
        "<html><title>Fox Facts</title><body>the quick brown fox jumps over the lazy dog</body></html>",
    )
    .await;

    let deployment = Deployment::new();
    let url = format!("{}/page", server.uri());

    let mut crawler = deployment.crawler(&url);
    crawler.seed_if_empty().unwrap();
    let doc_id = match crawler.step().await.unwrap() {
        CrawlOutcome::Crawled { doc_id } => doc_id,
        other => panic!("unexpected {:?}", other),
    };
    deployment.indexer().index_document(doc_id).unwrap();

    let app = build_router(deployment.engine());

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = app
        .oneshot(Request::get("/search?q=fox").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["query"], "fox");
    assert_eq!(json["meta"]["count"], 1);
    let result = &json["results"][0];
    assert_eq!(result["id"], doc_id);
    assert_eq!(result["url"], url);
    assert_eq!(result["title"], "Fox Facts");
    assert!(result["snippet"]
        .as_str()
        .unwrap()
        .contains("<b>fox</b>"));
    assert!(result["score"].as_f64().unwrap() > 0.0);
}

/// Invariant 3-adjacent: reserve is race-safe across store handles
#[test]
fn reserve_is_atomic_across_connections() {
    let deployment = Deployment::new();

    let mut first = deployment.store();
    let mut second = deployment.store();

    let a = first.reserve("https://example.test/same").unwrap();
    let b = second.reserve("https://example.test/same").unwrap();

    use kumo::storage::ReserveOutcome;
    assert!(matches!(a, ReserveOutcome::Reserved(_)));
    assert_eq!(b, ReserveOutcome::Duplicate);
    assert_eq!(deployment.store().count_documents().unwrap(), 1);
}

/// Invariant 2: every indexed doc id resolves and re-tokenizes to the term
#[tokio::test]
async fn index_entries_resolve_to_documents() {
    let server = MockServer::start().await;
    mock_page(&server, "/a", "<html><body>resolving tokens</body></html>").await;
    mock_page(&server, "/b", "<html><body>resolving again</body></html>").await;

    let deployment = Deployment::new();
    let url_a = format!("{}/a", server.uri());
    let url_b = format!("{}/b", server.uri());

    let mut crawler = deployment.crawler(&url_a);
    {
        let mut queue = deployment.queue();
        queue.push_crawl(&url_a).unwrap();
        queue.push_crawl(&url_b).unwrap();
    }
    let mut doc_ids = Vec::new();
    for _ in 0..2 {
        if let CrawlOutcome::Crawled { doc_id } = crawler.step().await.unwrap() {
            doc_ids.push(doc_id);
        }
    }
    let mut indexer = deployment.indexer();
    for &doc_id in &doc_ids {
        indexer.index_document(doc_id).unwrap();
    }
    drop(indexer);

    let store = deployment.store();
    let index = deployment.index();
    for doc_id in index.get_postings("resolving").unwrap() {
        let doc = store.get_document(doc_id).unwrap();
        let locator = doc.locator.unwrap();
        let slice = read_slice(
            &Path::new(&deployment.archive_dir()).join(&locator.file),
            locator.offset,
            locator.length,
        )
        .unwrap();
        let record = decompress_record(&slice, 10 * 1024 * 1024).unwrap();
        let text = kumo::indexer::extract_text(&String::from_utf8_lossy(record.payload()));
        assert!(kumo::indexer::tokenize(&text).contains(&"resolving".to_string()));
    }
    assert_eq!(index.get_postings("resolving").unwrap().len(), 2);
}
