//! Append-only archive of gzip-compressed WARC records
//!
//! An archive file is a sequence of concatenated gzip members; each member
//! decompresses to exactly one WARC response record. There is no index
//! inside the file: the metadata store holds a `(file, offset, length)`
//! locator per document, and the byte range `[offset, offset + length)` is
//! independently decompressible, so extraction is a single seek-and-read.

mod reader;
mod record;
mod writer;

pub use reader::{decompress_record, read_slice};
pub use record::WarcRecord;
pub use writer::ArchiveWriter;

use thiserror::Error;

/// Errors that can occur while writing or reading archive records
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Short read: expected {expected} bytes at offset {offset}, got {actual}")]
    ShortRead {
        offset: u64,
        expected: u64,
        actual: u64,
    },

    #[error("Decompressed record exceeds {limit} bytes")]
    Oversize { limit: u64 },

    #[error("Gzip decompression failed: {0}")]
    Decompress(std::io::Error),

    #[error("Record has no header terminator (CRLFCRLF)")]
    MissingHeaderEnd,
}

/// Result type for archive operations
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Locates one compressed record inside an archive file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLocator {
    /// Archive file basename; the full path is the configured archive
    /// directory joined with this name
    pub file: String,
    /// Byte position of the gzip member's first byte
    pub offset: u64,
    /// Byte length of the compressed member
    pub length: u64,
}
