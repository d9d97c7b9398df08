//! WARC record construction and parsing
//!
//! Records follow WARC/1.0: a plain-text header block terminated by a blank
//! line (CRLF CRLF), then the payload, then a trailing CRLF CRLF.

use crate::archive::{ArchiveError, ArchiveResult};
use chrono::Utc;
use uuid::Uuid;

const HEADER_END: &[u8] = b"\r\n\r\n";
const RECORD_TRAILER: &[u8] = b"\r\n\r\n";

/// One parsed WARC record: raw header block plus payload bytes
#[derive(Debug, Clone)]
pub struct WarcRecord {
    header: String,
    payload: Vec<u8>,
}

impl WarcRecord {
    /// Serializes a response record for the given URL and payload
    ///
    /// The header carries a fresh UUIDv4 record id and the current UTC
    /// timestamp; `Content-Length` is the payload's byte length.
    pub fn build(url: &str, payload: &[u8]) -> Vec<u8> {
        let header = build_header(url, payload.len());
        let mut record = Vec::with_capacity(header.len() + payload.len() + RECORD_TRAILER.len());
        record.extend_from_slice(header.as_bytes());
        record.extend_from_slice(payload);
        record.extend_from_slice(RECORD_TRAILER);
        record
    }

    /// Parses a decompressed record back into header block and payload
    ///
    /// The payload is everything between the first CRLF CRLF and the
    /// trailing CRLF CRLF (the trailer is stripped when present, so the
    /// payload round-trips byte-equal through build/parse).
    pub fn parse(bytes: &[u8]) -> ArchiveResult<Self> {
        let header_end = find_header_end(bytes).ok_or(ArchiveError::MissingHeaderEnd)?;
        let header = String::from_utf8_lossy(&bytes[..header_end]).into_owned();

        let mut payload = &bytes[header_end + HEADER_END.len()..];
        if payload.ends_with(RECORD_TRAILER) {
            payload = &payload[..payload.len() - RECORD_TRAILER.len()];
        }

        Ok(Self {
            header,
            payload: payload.to_vec(),
        })
    }

    /// The raw header block, without the terminating blank line
    pub fn header(&self) -> &str {
        &self.header
    }

    /// The record payload
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Value of a header field, if present
    pub fn header_field(&self, name: &str) -> Option<&str> {
        self.header.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            if key.trim().eq_ignore_ascii_case(name) {
                Some(value.trim())
            } else {
                None
            }
        })
    }

    /// The `WARC-Target-URI` header value, if present
    pub fn target_uri(&self) -> Option<&str> {
        self.header_field("WARC-Target-URI")
    }
}

/// Byte offset of the first CRLF CRLF in `bytes`
pub(crate) fn find_header_end(bytes: &[u8]) -> Option<usize> {
    bytes.windows(HEADER_END.len()).position(|w| w == HEADER_END)
}

fn build_header(url: &str, content_length: usize) -> String {
    let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        "WARC/1.0\r\n\
         WARC-Type: response\r\n\
         WARC-Target-URI: {url}\r\n\
         WARC-Date: {timestamp}\r\n\
         WARC-Record-ID: <urn:uuid:{record_id}>\r\n\
         Content-Type: application/http; msgtype=response\r\n\
         Content-Length: {content_length}\r\n\
         \r\n",
        url = url,
        timestamp = timestamp,
        record_id = Uuid::new_v4(),
        content_length = content_length,
    )
}
