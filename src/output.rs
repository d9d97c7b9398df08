//! Corpus statistics reporting
//!
//! Backs the `stats` subcommand: gathers counts from the metadata store,
//! queue, and index, and prints them for operators.

use crate::index::IndexStore;
use crate::queue::JobQueue;
use crate::state::DocStatus;
use crate::storage::MetadataStore;
use crate::Result;
use std::collections::HashMap;

/// A snapshot of pipeline state
#[derive(Debug)]
pub struct PipelineStats {
    pub total_documents: u64,
    pub by_status: HashMap<DocStatus, u64>,
    /// Documents whose bytes are in the archive
    pub archived_documents: u64,
    /// Documents the pipeline may still act on
    pub in_flight_documents: u64,
    pub avg_doc_length: f64,
    pub distinct_terms: u64,
    pub crawl_queue_len: u64,
    pub indexing_queue_len: u64,
}

/// Gathers statistics from the live stores
pub fn load_statistics<S: MetadataStore, Q: JobQueue>(
    store: &S,
    queue: &Q,
    index: &IndexStore,
) -> Result<PipelineStats> {
    let corpus = store.corpus_stats()?;
    let by_status = store.count_by_status()?;

    let archived_documents = by_status
        .iter()
        .filter(|(status, _)| status.is_archived())
        .map(|(_, count)| count)
        .sum();
    let in_flight_documents = by_status
        .iter()
        .filter(|(status, _)| !status.is_terminal())
        .map(|(_, count)| count)
        .sum();

    Ok(PipelineStats {
        total_documents: store.count_documents()?,
        by_status,
        archived_documents,
        in_flight_documents,
        avg_doc_length: corpus.avg_doc_length,
        distinct_terms: index.term_count()?,
        crawl_queue_len: queue.crawl_len()?,
        indexing_queue_len: queue.index_len()?,
    })
}

/// Prints statistics in a human-readable layout
pub fn print_statistics(stats: &PipelineStats) {
    println!("Documents: {}", stats.total_documents);
    for status in DocStatus::all_statuses() {
        let count = stats.by_status.get(&status).copied().unwrap_or(0);
        if count > 0 {
            println!("  {:<20} {}", status.to_db_string(), count);
        }
    }
    println!("Archived: {}", stats.archived_documents);
    println!("In flight: {}", stats.in_flight_documents);
    println!("Average doc length: {:.1} tokens", stats.avg_doc_length);
    println!("Distinct terms: {}", stats.distinct_terms);
    println!("Crawl queue: {} pending", stats.crawl_queue_len);
    println!("Indexing queue: {} pending", stats.indexing_queue_len);
}
