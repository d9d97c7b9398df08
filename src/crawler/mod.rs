//! Crawler worker
//!
//! The crawler drains the crawl queue: each iteration pops a URL, reserves
//! it in the metadata store (duplicates are dropped here), fetches it over
//! HTTP, appends the body to the archive, records the locator, and enqueues
//! an indexing job. A single bad URL never terminates the loop.

mod fetcher;
mod parser;
mod worker;

pub use fetcher::{build_http_client, fetch_url, FetchOutcome};
pub use parser::extract_links;
pub use worker::{CrawlOutcome, CrawlerWorker};
