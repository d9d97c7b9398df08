//! Ranking HTTP service
//!
//! Exposes `/health` and `/search`. A query is normalized with the same
//! rules the indexer applies, candidate documents are gathered from the
//! inverted index, scored with a reduced BM25 (the posting encoding stores
//! membership only, so term frequency is taken as 1), and the top results
//! are joined with metadata and snippets.

mod engine;
mod handlers;
mod snippet;

pub use engine::{normalize_query, RankerEngine, SearchOutcome, SearchResult};
pub use handlers::{build_router, AppState};
pub use snippet::build_snippet;
