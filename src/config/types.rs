use serde::Deserialize;

/// Main configuration structure for Kumo
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub indexer: IndexerConfig,
    #[serde(default)]
    pub ranker: RankerConfig,
    pub stores: StoresConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URL pushed onto the crawl queue when it is empty at startup
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Global politeness delay after each fetch (milliseconds)
    #[serde(rename = "crawl-delay-ms", default = "default_crawl_delay_ms")]
    pub crawl_delay_ms: u64,

    /// Sleep between polls when the crawl queue is empty (milliseconds)
    #[serde(rename = "queue-poll-ms", default = "default_queue_poll_ms")]
    pub queue_poll_ms: u64,

    /// HTTP fetch timeout (seconds)
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Attempts to enqueue an index job before giving up
    #[serde(rename = "enqueue-retries", default = "default_enqueue_retries")]
    pub enqueue_retries: u32,

    /// Attempts to open the metadata store at startup
    #[serde(rename = "store-connect-retries", default = "default_store_retries")]
    pub store_connect_retries: u32,

    /// Backoff between store connection attempts (seconds)
    #[serde(rename = "store-connect-backoff-secs", default = "default_store_backoff")]
    pub store_connect_backoff_secs: u64,

    /// Extract anchor links from fetched pages and push them onto the
    /// crawl queue
    #[serde(rename = "follow-links", default)]
    pub follow_links: bool,
}

/// Indexer behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IndexerConfig {
    /// Cap on the decompressed size of one archive record (bytes)
    #[serde(rename = "max-decompressed-bytes", default = "default_max_decompressed")]
    pub max_decompressed_bytes: u64,

    /// Sleep between polls of the indexing queue (milliseconds)
    #[serde(rename = "queue-poll-ms", default = "default_index_poll_ms")]
    pub queue_poll_ms: u64,
}

/// Ranking service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RankerConfig {
    /// Address the HTTP service binds to
    #[serde(rename = "bind-addr", default = "default_bind_addr")]
    pub bind_addr: String,

    /// Number of results returned per query
    #[serde(rename = "top-k", default = "default_top_k")]
    pub top_k: usize,

    /// Cache ranked results per normalized query
    #[serde(rename = "cache-enabled", default)]
    pub cache_enabled: bool,

    /// Lifetime of a cached result list (seconds)
    #[serde(rename = "cache-ttl-secs", default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

/// Store locations
#[derive(Debug, Clone, Deserialize)]
pub struct StoresConfig {
    /// Path to the SQLite metadata database
    #[serde(rename = "metadata-path")]
    pub metadata_path: String,

    /// Path to the SQLite queue database
    #[serde(rename = "queue-path")]
    pub queue_path: String,

    /// Path to the redb inverted-index database
    #[serde(rename = "index-path")]
    pub index_path: String,

    /// Directory holding archive files
    #[serde(rename = "archive-dir")]
    pub archive_dir: String,

    /// Basename of the archive file this crawler instance appends to
    #[serde(rename = "archive-file", default = "default_archive_file")]
    pub archive_file: String,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

fn default_crawl_delay_ms() -> u64 {
    1000
}

fn default_queue_poll_ms() -> u64 {
    5000
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_enqueue_retries() -> u32 {
    3
}

fn default_store_retries() -> u32 {
    10
}

fn default_store_backoff() -> u64 {
    5
}

fn default_max_decompressed() -> u64 {
    100 * 1024 * 1024
}

fn default_index_poll_ms() -> u64 {
    500
}

fn default_bind_addr() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_top_k() -> usize {
    10
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_archive_file() -> String {
    "archive-00001.warc.gz".to_string()
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            max_decompressed_bytes: default_max_decompressed(),
            queue_poll_ms: default_index_poll_ms(),
        }
    }
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            top_k: default_top_k(),
            cache_enabled: false,
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}
