//! Indexer worker
//!
//! The indexer drains the indexing queue: each job names a document whose
//! bytes are already archived. The worker reads the record back by locator,
//! decompresses it under a size cap, splits the WARC envelope off, extracts
//! visible text, tokenizes, and folds the document into the inverted index
//! and its token count into the metadata store.

mod text;
mod tokenizer;
mod worker;

pub use text::{extract_text, extract_title};
pub use tokenizer::{tokenize, MIN_TOKEN_LEN};
pub use worker::IndexerWorker;
