//! Connection Handler
//!
//! Reads command lines from one client and hands them to the work queue.
//! Responses come back through the shared [`ConnectionWriter`].

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::{Backpressure, Config};
use crate::error::Result;
use crate::protocol::{encode_response, LineSplitter, ResponseSink};
use crate::queue::{EnqueueOutcome, PendingRequest, WorkQueue};

/// Socket read chunk size
const READ_CHUNK: usize = 512;

/// Body sent instead of a result under the `Reject` backpressure policy
pub const SERVER_BUSY: &str = "Server busy. Request dropped.";

// =============================================================================
// Writer Half
// =============================================================================

/// Write half of a client connection, shared by every in-flight request
///
/// Each response (body + terminator) is written under one lock, so two
/// workers answering the same client never interleave.
pub struct ConnectionWriter {
    stream: Mutex<TcpStream>,
    peer: String,
    closed: AtomicBool,
}

impl ConnectionWriter {
    pub fn new(stream: TcpStream, peer: impl Into<String>) -> Self {
        Self {
            stream: Mutex::new(stream),
            peer: peer.into(),
            closed: AtomicBool::new(false),
        }
    }

    /// Mark closed; later sends fail without touching the socket
    pub fn mark_closed(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl ResponseSink for ConnectionWriter {
    fn send_response(&self, body: &str) -> io::Result<()> {
        if self.is_closed() {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "connection already closed",
            ));
        }
        let frame = encode_response(body);
        let mut stream = self.stream.lock();
        stream.write_all(&frame)?;
        stream.flush()
    }

    fn peer(&self) -> &str {
        &self.peer
    }
}

// =============================================================================
// Reader Half
// =============================================================================

/// Handles a single client connection's inbound side
pub struct Connection {
    /// Read half of the TCP stream
    reader: TcpStream,

    /// Write half, shared with workers through queued requests
    writer: Arc<ConnectionWriter>,

    /// Destination for parsed command lines
    queue: Arc<WorkQueue>,

    /// What to do when the queue is full
    backpressure: Backpressure,

    /// Accumulates bytes until a line terminator
    splitter: LineSplitter,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, queue: Arc<WorkQueue>, config: &Config) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let write_stream = stream.try_clone()?;

        Ok(Self {
            reader: stream,
            writer: Arc::new(ConnectionWriter::new(write_stream, peer_addr.clone())),
            queue,
            backpressure: config.backpressure,
            splitter: LineSplitter::new(config.max_line_bytes),
            peer_addr,
        })
    }

    /// Read until the peer closes or the socket fails, enqueueing each line
    ///
    /// A read error ends the connection the same way EOF does; it is not
    /// reported to the caller.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let n = match self.reader.read(&mut chunk) {
                Ok(0) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    break;
                }
                Ok(n) => n,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::debug!("Read from {} failed: {}", self.peer_addr, e);
                    break;
                }
            };

            let truncated_before = self.splitter.truncated_bytes();
            let lines = self.splitter.push(&chunk[..n]);
            if self.splitter.truncated_bytes() > truncated_before {
                tracing::debug!("Line from {} exceeded buffer; overflow dropped", self.peer_addr);
            }

            for line in lines {
                self.submit(line);
            }
        }

        self.close();
        Ok(())
    }

    /// Offer one line to the queue under the configured backpressure policy
    fn submit(&self, line: String) {
        tracing::trace!("Received line from {}: {:?}", self.peer_addr, line);

        let request = PendingRequest::new(self.writer.clone(), line);
        let outcome = match self.backpressure {
            Backpressure::Drop | Backpressure::Reject => self.queue.enqueue(request),
            Backpressure::Block { timeout } => self.queue.enqueue_timeout(request, timeout),
        };

        match outcome {
            EnqueueOutcome::Queued => {}
            EnqueueOutcome::Full => {
                tracing::warn!("Work queue full; dropping request from {}", self.peer_addr);
                if self.backpressure == Backpressure::Reject {
                    if let Err(e) = self.writer.send_response(SERVER_BUSY) {
                        tracing::debug!("Could not send busy reply to {}: {}", self.peer_addr, e);
                    }
                }
            }
            EnqueueOutcome::Closed => {
                tracing::debug!("Server shutting down; ignoring request from {}", self.peer_addr);
            }
        }
    }

    /// Stop accepting input and make pending responses fail quietly
    fn close(&self) {
        self.writer.mark_closed();
        if let Err(e) = self.reader.shutdown(Shutdown::Both) {
            if e.kind() != io::ErrorKind::NotConnected {
                tracing::debug!("Shutdown of {} failed: {}", self.peer_addr, e);
            }
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
