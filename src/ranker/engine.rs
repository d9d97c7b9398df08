//! Query scoring engine
//!
//! Scoring follows Okapi BM25 with the term frequency fixed at 1: the
//! posting encoding stores doc-id membership only, so each listed document
//! counts a single occurrence per term. Document length still modulates the
//! score through the usual length normalization.

use crate::archive::{decompress_record, read_slice};
use crate::index::IndexStore;
use crate::indexer::{extract_text, tokenize, MIN_TOKEN_LEN};
use crate::queue::JobQueue;
use crate::ranker::snippet::build_snippet;
use crate::storage::{DocumentSummary, MetadataStore};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Term frequency saturation
const K1: f64 = 1.2;
/// Length normalization strength
const B: f64 = 0.75;

/// Cap on the decompressed size of a record read back for snippets
const SNIPPET_DECOMPRESS_CAP: u64 = 100 * 1024 * 1024;

/// Query tokens carrying no ranking signal
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "was", "were", "with", "from", "this", "that",
    "have", "has", "had", "you", "your", "they", "them", "their", "its", "can", "will", "all",
    "any", "about", "into", "over", "under", "there", "here", "what", "when", "where", "which",
    "who", "how", "why",
];

/// One ranked search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub score: f64,
}

/// A completed search
#[derive(Debug)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    /// Whether the result list was served from the query cache
    pub cached: bool,
}

/// Normalizes a raw query into lookup terms
///
/// Case-folds, strips punctuation, splits on whitespace, and drops stop
/// words and tokens shorter than the indexer's minimum. Returns the terms
/// and the normalized string used as the cache key.
pub fn normalize_query(raw: &str) -> (Vec<String>, String) {
    let terms: Vec<String> = tokenize(raw)
        .into_iter()
        .filter(|t| t.len() >= MIN_TOKEN_LEN && !STOP_WORDS.contains(&t.as_str()))
        .collect();
    let normalized = terms.join(" ");
    (terms, normalized)
}

/// The scoring engine behind the search endpoint
///
/// Handlers are request-scoped and stateless; the engine holds the shared
/// store handles. Store access is serialized behind mutexes because the
/// SQLite connections are single-threaded; the index supports concurrent
/// readers as-is.
pub struct RankerEngine<S: MetadataStore, Q: JobQueue> {
    store: Mutex<S>,
    queue: Mutex<Q>,
    index: IndexStore,
    archive_dir: PathBuf,
    top_k: usize,
    cache_enabled: bool,
    cache_ttl_secs: u64,
}

impl<S: MetadataStore, Q: JobQueue> RankerEngine<S, Q> {
    pub fn new(
        store: S,
        queue: Q,
        index: IndexStore,
        archive_dir: PathBuf,
        top_k: usize,
        cache_enabled: bool,
        cache_ttl_secs: u64,
    ) -> Self {
        Self {
            store: Mutex::new(store),
            queue: Mutex::new(queue),
            index,
            archive_dir,
            top_k,
            cache_enabled,
            cache_ttl_secs,
        }
    }

    /// Runs the full query pipeline and returns ranked results
    pub fn search(&self, raw_query: &str) -> Result<SearchOutcome> {
        let (terms, normalized) = normalize_query(raw_query);
        if terms.is_empty() {
            return Ok(SearchOutcome {
                results: Vec::new(),
                cached: false,
            });
        }

        if self.cache_enabled {
            if let Some(results) = self.cache_lookup(&normalized) {
                return Ok(SearchOutcome {
                    results,
                    cached: true,
                });
            }
        }

        let ranked = self.score(&terms)?;
        let results = self.hydrate(ranked, &terms)?;

        if self.cache_enabled {
            self.cache_store(&normalized, &results);
        }

        Ok(SearchOutcome {
            results,
            cached: false,
        })
    }

    /// Scores every candidate document and returns the top K (id, score)
    /// pairs, ties broken by ascending doc id
    fn score(&self, terms: &[String]) -> Result<Vec<(i64, f64)>> {
        let mut term_postings: Vec<Vec<i64>> = Vec::with_capacity(terms.len());
        let mut candidates: Vec<i64> = Vec::new();
        for term in terms {
            // A missing term is an empty posting list, not an error
            let postings: Vec<i64> = self.index.get_postings(term)?.into_iter().collect();
            candidates.extend(&postings);
            term_postings.push(postings);
        }
        candidates.sort_unstable();
        candidates.dedup();

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let (stats, doc_lengths) = {
            let store = self.store.lock().unwrap_or_else(|p| p.into_inner());
            (store.corpus_stats()?, store.get_doc_lengths(&candidates)?)
        };
        let n = stats.total_docs.max(1) as f64;
        let avgdl = stats.avg_doc_length.max(1.0);

        let mut scores: HashMap<i64, f64> = HashMap::new();
        for postings in &term_postings {
            if postings.is_empty() {
                continue;
            }

            let n_t = postings.len() as f64;
            let idf = ((n - n_t + 0.5) / (n_t + 0.5) + 1.0).ln();

            for &doc_id in postings {
                // Membership-only postings: one occurrence per listed doc
                let tf = 1.0;
                let doc_len = doc_lengths
                    .get(&doc_id)
                    .map(|&l| l as f64)
                    .unwrap_or(avgdl);
                let denominator = tf + K1 * (1.0 - B + B * (doc_len / avgdl));
                *scores.entry(doc_id).or_insert(0.0) += idf * tf * (K1 + 1.0) / denominator;
            }
        }

        let mut ranked: Vec<(i64, f64)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        ranked.truncate(self.top_k);
        Ok(ranked)
    }

    /// Joins scored ids with metadata and builds snippets
    fn hydrate(&self, ranked: Vec<(i64, f64)>, terms: &[String]) -> Result<Vec<SearchResult>> {
        let ids: Vec<i64> = ranked.iter().map(|(id, _)| *id).collect();
        let summaries = {
            let store = self.store.lock().unwrap_or_else(|p| p.into_inner());
            store.get_summaries(&ids)?
        };
        let by_id: HashMap<i64, DocumentSummary> =
            summaries.into_iter().map(|s| (s.id, s)).collect();

        let mut results = Vec::with_capacity(ranked.len());
        for (doc_id, score) in ranked {
            let Some(summary) = by_id.get(&doc_id) else {
                continue;
            };

            let snippet = summary
                .locator
                .as_ref()
                .and_then(|locator| {
                    let path = self.archive_dir.join(&locator.file);
                    let slice = read_slice(&path, locator.offset, locator.length).ok()?;
                    let record = decompress_record(&slice, SNIPPET_DECOMPRESS_CAP).ok()?;
                    let text = extract_text(&String::from_utf8_lossy(record.payload()));
                    build_snippet(&text, terms)
                })
                .unwrap_or_default();

            results.push(SearchResult {
                id: doc_id,
                url: summary.url.clone(),
                title: summary.title.clone().unwrap_or_else(|| summary.url.clone()),
                snippet,
                score,
            });
        }
        Ok(results)
    }

    fn cache_lookup(&self, normalized: &str) -> Option<Vec<SearchResult>> {
        let mut queue = self.queue.lock().unwrap_or_else(|p| p.into_inner());
        match queue.cache_get(normalized) {
            Ok(Some(serialized)) => serde_json::from_str(&serialized).ok(),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Query cache lookup failed: {}", e);
                None
            }
        }
    }

    fn cache_store(&self, normalized: &str, results: &[SearchResult]) {
        let Ok(serialized) = serde_json::to_string(results) else {
            return;
        };
        let mut queue = self.queue.lock().unwrap_or_else(|p| p.into_inner());
        if let Err(e) = queue.cache_put(normalized, &serialized, self.cache_ttl_secs) {
            tracing::warn!("Query cache write failed: {}", e);
        }
    }
}
