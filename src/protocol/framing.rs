//! Wire framing
//!
//! ## Request Framing
//! ```text
//! SCHEDULE\n
//! UPDATE R101 15\r\n
//! ```
//! Either `\n` or `\r` ends a line. Empty lines are skipped. A line longer than
//! the buffer keeps its first `limit` bytes; the rest is discarded rather than
//! becoming a second command.
//!
//! ### Response Framing
//! ```text
//! ┌─────────────────────────────┬──────────────────┐
//! │        Body (UTF-8)         │  "\n==END==\n"   │
//! └─────────────────────────────┴──────────────────┘
//! ```

use std::io::{BufRead, Write};

use bytes::{BufMut, BytesMut};

use crate::error::{Result, StationError};

/// Sentinel appended after every response body
pub const RESPONSE_TERMINATOR: &str = "\n==END==\n";

// =============================================================================
// Request Lines
// =============================================================================

/// Splits an incoming byte stream into command lines
#[derive(Debug)]
pub struct LineSplitter {
    /// Bytes of the line being accumulated
    buf: BytesMut,

    /// Capacity of one line
    limit: usize,

    /// Bytes discarded because a line overflowed `limit`
    truncated: u64,
}

impl LineSplitter {
    pub fn new(limit: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(limit),
            limit,
            truncated: 0,
        }
    }

    /// Feed a chunk read from the socket; returns every line it completed
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();

        for &byte in chunk {
            if byte == b'\n' || byte == b'\r' {
                if !self.buf.is_empty() {
                    let line = self.buf.split();
                    lines.push(String::from_utf8_lossy(&line).into_owned());
                }
            } else if self.buf.len() < self.limit {
                self.buf.put_u8(byte);
            } else {
                self.truncated += 1;
            }
        }

        lines
    }

    /// Bytes buffered for an unterminated line
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Total overflow bytes discarded so far
    pub fn truncated_bytes(&self) -> u64 {
        self.truncated
    }
}

// =============================================================================
// Responses
// =============================================================================

/// Body followed by the terminator
pub fn encode_response(body: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(body.len() + RESPONSE_TERMINATOR.len());
    bytes.extend_from_slice(body.as_bytes());
    bytes.extend_from_slice(RESPONSE_TERMINATOR.as_bytes());
    bytes
}

/// Write one framed response and flush
pub fn write_response<W: Write>(writer: &mut W, body: &str) -> Result<()> {
    writer.write_all(&encode_response(body))?;
    writer.flush()?;
    Ok(())
}

/// Read bytes until the terminator and return the body before it
///
/// `Ok(None)` means the peer closed cleanly between responses.
pub fn read_response<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let terminator = RESPONSE_TERMINATOR.as_bytes();
    let mut buf = Vec::new();

    loop {
        let n = reader.read_until(b'\n', &mut buf)?;
        if n == 0 {
            if buf.is_empty() {
                return Ok(None);
            }
            return Err(StationError::Protocol(format!(
                "connection closed after {} bytes without a response terminator",
                buf.len()
            )));
        }

        if buf.ends_with(terminator) {
            buf.truncate(buf.len() - terminator.len());
            return Ok(Some(String::from_utf8_lossy(&buf).into_owned()));
        }
    }
}

/// Send one command line (adds the `\n`)
pub fn write_request<W: Write>(writer: &mut W, line: &str) -> Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
