//! Archive writer: appends gzip-compressed WARC records
//!
//! The writer owns the archive file handle behind a mutex, so concurrent
//! callers are serialized and the `(offset, length)` returned to each is
//! exactly what a reader will find at that offset.

use crate::archive::record::WarcRecord;
use crate::archive::ArchiveResult;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Appends WARC response records to a single archive file
pub struct ArchiveWriter {
    path: PathBuf,
    file: Mutex<File>,
}

impl ArchiveWriter {
    /// Opens (or creates) an archive file for appending
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the archive file; parent directories must exist
    pub fn open(path: &Path) -> ArchiveResult<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    /// Appends one record and returns its locator within the file
    ///
    /// The record is built per WARC/1.0, compressed as a single gzip member
    /// at the default level, and appended at end of file. On any write or
    /// flush failure the record counts as not written; callers must not mark
    /// the document crawled.
    ///
    /// # Arguments
    ///
    /// * `url` - The document's canonical URL
    /// * `payload` - The fetched HTTP payload
    ///
    /// # Returns
    ///
    /// `(offset, length)` - byte position of the gzip member's first byte
    /// and the compressed member's byte length
    pub fn write_record(&self, url: &str, payload: &[u8]) -> ArchiveResult<(u64, u64)> {
        let record = WarcRecord::build(url, payload);

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&record)?;
        let compressed = encoder.finish()?;

        let mut file = self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let offset = file.seek(SeekFrom::End(0))?;
        file.write_all(&compressed)?;
        file.flush()?;

        Ok((offset, compressed.len() as u64))
    }

    /// The path this writer appends to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The archive file's basename, as stored in document locators
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
