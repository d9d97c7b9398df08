//! Kumo main entry point
//!
//! Each pipeline role runs as its own long-lived process: `crawl`, `index`,
//! and `serve` share the stores configured in the TOML file; `stats` prints
//! a snapshot and exits.

use clap::{Parser, Subcommand};
use kumo::archive::ArchiveWriter;
use kumo::config::{load_config, Config};
use kumo::crawler::{build_http_client, CrawlerWorker};
use kumo::index::IndexStore;
use kumo::indexer::IndexerWorker;
use kumo::output::{load_statistics, print_statistics};
use kumo::ranker::{build_router, RankerEngine};
use kumo::{KumoError, SqliteMetadataStore, SqliteQueue};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Kumo: a queue-driven crawl, index, and search pipeline
#[derive(Parser, Debug)]
#[command(name = "kumo")]
#[command(version = "0.1.0")]
#[command(about = "A queue-driven crawl, index, and search pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the crawler worker
    Crawl {
        /// Path to TOML configuration file
        config: PathBuf,
    },
    /// Run the indexer worker
    Index {
        /// Path to TOML configuration file
        config: PathBuf,
    },
    /// Run the ranking HTTP service
    Serve {
        /// Path to TOML configuration file
        config: PathBuf,
    },
    /// Print pipeline statistics and exit
    Stats {
        /// Path to TOML configuration file
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let config_path = match &cli.command {
        Commands::Crawl { config }
        | Commands::Index { config }
        | Commands::Serve { config }
        | Commands::Stats { config } => config.clone(),
    };

    tracing::info!("Loading configuration from: {}", config_path.display());
    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    match cli.command {
        Commands::Crawl { .. } => run_crawler(config).await?,
        Commands::Index { .. } => run_indexer(config).await?,
        Commands::Serve { .. } => run_ranker(config).await?,
        Commands::Stats { .. } => run_stats(config)?,
    }

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kumo=info,warn"),
            1 => EnvFilter::new("kumo=debug,info"),
            2 => EnvFilter::new("kumo=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Opens the metadata store, retrying with backoff
///
/// Another process may hold the database locked during startup races; after
/// the attempts are exhausted the caller terminates with non-zero status.
async fn open_store_with_retry(
    path: &Path,
    retries: u32,
    backoff: Duration,
) -> kumo::Result<SqliteMetadataStore> {
    let mut last_error = String::new();
    for attempt in 1..=retries.max(1) {
        match SqliteMetadataStore::open(path) {
            Ok(store) => {
                tracing::info!("Connected to metadata store: {}", path.display());
                return Ok(store);
            }
            Err(e) => {
                tracing::warn!(
                    "Metadata store connection attempt {} failed: {}",
                    attempt,
                    e
                );
                last_error = e.to_string();
            }
        }
        if attempt < retries {
            tracing::info!("Retrying metadata store connection in {:?}", backoff);
            tokio::time::sleep(backoff).await;
        }
    }

    Err(KumoError::StoreUnavailable {
        attempts: retries,
        message: last_error,
    })
}

/// Runs the crawler worker loop
async fn run_crawler(config: Config) -> kumo::Result<()> {
    std::fs::create_dir_all(&config.stores.archive_dir)?;

    // Queue failures are fatal at startup
    let queue = SqliteQueue::open(Path::new(&config.stores.queue_path))?;

    let store = open_store_with_retry(
        Path::new(&config.stores.metadata_path),
        config.crawler.store_connect_retries,
        Duration::from_secs(config.crawler.store_connect_backoff_secs),
    )
    .await?;

    let archive_path = Path::new(&config.stores.archive_dir).join(&config.stores.archive_file);
    let archive = ArchiveWriter::open(&archive_path)?;

    let client = build_http_client(
        &config.user_agent,
        Duration::from_secs(config.crawler.fetch_timeout_secs),
    )?;

    tracing::info!("Crawler started (archive: {})", archive_path.display());
    let mut worker = CrawlerWorker::new(store, queue, archive, client, config.crawler);
    worker.run().await
}

/// Runs the indexer worker loop
async fn run_indexer(config: Config) -> kumo::Result<()> {
    let queue = SqliteQueue::open(Path::new(&config.stores.queue_path))?;

    let store = open_store_with_retry(
        Path::new(&config.stores.metadata_path),
        config.crawler.store_connect_retries,
        Duration::from_secs(config.crawler.store_connect_backoff_secs),
    )
    .await?;

    let index = IndexStore::open(Path::new(&config.stores.index_path))?;

    tracing::info!("Indexer started (index: {})", config.stores.index_path);
    let mut worker = IndexerWorker::new(
        store,
        queue,
        index,
        PathBuf::from(&config.stores.archive_dir),
        config.indexer,
    );
    worker.run().await
}

/// Runs the ranking HTTP service
async fn run_ranker(config: Config) -> kumo::Result<()> {
    let store = SqliteMetadataStore::open(Path::new(&config.stores.metadata_path))?;
    let queue = SqliteQueue::open(Path::new(&config.stores.queue_path))?;
    let index = IndexStore::open(Path::new(&config.stores.index_path))?;

    let engine = RankerEngine::new(
        store,
        queue,
        index,
        PathBuf::from(&config.stores.archive_dir),
        config.ranker.top_k,
        config.ranker.cache_enabled,
        config.ranker.cache_ttl_secs,
    );
    let app = build_router(engine);

    let listener = tokio::net::TcpListener::bind(&config.ranker.bind_addr).await?;
    tracing::info!("Ranking service listening on {}", config.ranker.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Prints pipeline statistics
fn run_stats(config: Config) -> kumo::Result<()> {
    let store = SqliteMetadataStore::open(Path::new(&config.stores.metadata_path))?;
    let queue = SqliteQueue::open(Path::new(&config.stores.queue_path))?;
    let index = IndexStore::open(Path::new(&config.stores.index_path))?;

    let stats = load_statistics(&store, &queue, &index)?;
    print_statistics(&stats);

    Ok(())
}
