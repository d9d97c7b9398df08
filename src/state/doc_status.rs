/// Document status definitions for tracking pipeline progress
///
/// This module defines all possible states a document can be in between
/// first sighting by the crawler and successful indexing.
use std::fmt;

/// Represents the current status of a document in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocStatus {
    /// Document row exists but no worker has claimed it
    Pending,

    /// A crawler has reserved the URL and is fetching it
    Processing,

    /// Document is archived and its index job was enqueued
    Crawled,

    /// Document is archived but the index enqueue exhausted its retries
    CrawledNotQueued,

    /// Fetch or archive write failed
    Error,
}

impl DocStatus {
    /// Returns true if no further pipeline work is expected for this status
    ///
    /// `Crawled` is not terminal: the indexer still has to process the
    /// document, and a crawled row may yet move to `CrawledNotQueued`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::CrawledNotQueued | Self::Error)
    }

    /// Returns true if the document's bytes are in the archive
    pub fn is_archived(&self) -> bool {
        matches!(self, Self::Crawled | Self::CrawledNotQueued)
    }

    /// Returns true if the transition `self -> to` is allowed
    ///
    /// The lifecycle is monotonic: pending -> processing -> {crawled, error},
    /// and crawled_not_queued is reachable only from crawled.
    pub fn can_transition(&self, to: DocStatus) -> bool {
        match (self, to) {
            (Self::Pending, Self::Processing) => true,
            (Self::Processing, Self::Crawled) => true,
            (Self::Processing, Self::Error) => true,
            (Self::Crawled, Self::CrawledNotQueued) => true,
            _ => false,
        }
    }

    /// Returns the statuses allowed to transition into `self`
    ///
    /// The metadata store derives its SQL transition guards from this, so
    /// the lifecycle above is the single definition of what moves where.
    pub fn valid_sources(self) -> Vec<DocStatus> {
        Self::all_statuses()
            .into_iter()
            .filter(|source| source.can_transition(self))
            .collect()
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Crawled => "crawled",
            Self::CrawledNotQueued => "crawled_not_queued",
            Self::Error => "error",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "crawled" => Some(Self::Crawled),
            "crawled_not_queued" => Some(Self::CrawledNotQueued),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Returns all possible statuses
    pub fn all_statuses() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::Processing,
            Self::Crawled,
            Self::CrawledNotQueued,
            Self::Error,
        ]
    }
}

impl fmt::Display for DocStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
