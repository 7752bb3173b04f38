//! Response destinations
//!
//! Workers reply through a [`ResponseSink`]; the connection owns the socket
//! and its write lock.

use std::io;

/// The originating side of a request
pub trait ResponseSink: Send + Sync {
    /// Write `body` plus the terminator as one uninterrupted response
    fn send_response(&self, body: &str) -> io::Result<()>;

    /// Peer label for logs and report lines
    fn peer(&self) -> &str;
}
