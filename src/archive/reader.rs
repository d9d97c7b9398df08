//! Random-access reads of archived records
//!
//! Given a locator, extraction is: seek to the offset, read exactly the
//! compressed length, and inflate that slice as one gzip member. The
//! decompressed size is capped to bound memory on hostile or corrupt input.

use crate::archive::record::WarcRecord;
use crate::archive::{ArchiveError, ArchiveResult};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Reads exactly `length` bytes at `offset` from an archive file
///
/// # Arguments
///
/// * `path` - Full path to the archive file
/// * `offset` - Byte position of the record's first byte
/// * `length` - Compressed byte length of the record
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - The compressed record bytes
/// * `Err(ArchiveError::ShortRead)` - The file ends before `offset + length`
pub fn read_slice(path: &Path, offset: u64, length: u64) -> ArchiveResult<Vec<u8>> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(offset))?;

    let mut buffer = vec![0u8; length as usize];
    let mut read_total = 0usize;
    while read_total < buffer.len() {
        let n = file.read(&mut buffer[read_total..])?;
        if n == 0 {
            return Err(ArchiveError::ShortRead {
                offset,
                expected: length,
                actual: read_total as u64,
            });
        }
        read_total += n;
    }

    Ok(buffer)
}

/// Decompresses one gzip member and parses it as a WARC record
///
/// # Arguments
///
/// * `compressed` - The compressed record bytes
/// * `max_bytes` - Cap on the decompressed size
///
/// # Returns
///
/// * `Ok(WarcRecord)` - The parsed record
/// * `Err(ArchiveError::Oversize)` - The record inflates past `max_bytes`
/// * `Err(ArchiveError::Decompress)` - The slice is not a valid gzip member
pub fn decompress_record(compressed: &[u8], max_bytes: u64) -> ArchiveResult<WarcRecord> {
    let mut decoder = GzDecoder::new(compressed).take(max_bytes + 1);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(ArchiveError::Decompress)?;

    if decompressed.len() as u64 > max_bytes {
        return Err(ArchiveError::Oversize { limit: max_bytes });
    }

    WarcRecord::parse(&decompressed)
}
