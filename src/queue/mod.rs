//! Queue Module
//!
//! Bounded hand-off between connection readers and workers.
//!
//! ## Responsibilities
//! - Decouple socket I/O from command execution
//! - Bound memory under overload (backpressure)
//! - Hand each request to exactly one worker, in arrival order

mod work_queue;

use std::sync::Arc;

use crate::protocol::ResponseSink;

pub use work_queue::{EnqueueOutcome, WorkQueue};

/// One command line waiting for a worker
///
/// Owned by the queue until a single worker dequeues it; the worker then owns
/// it until the response is written.
pub struct PendingRequest {
    /// Where the response goes
    pub reply_to: Arc<dyn ResponseSink>,

    /// Raw command line, terminator stripped
    pub line: String,
}

impl PendingRequest {
    pub fn new(reply_to: Arc<dyn ResponseSink>, line: impl Into<String>) -> Self {
        Self {
            reply_to,
            line: line.into(),
        }
    }
}

impl std::fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequest")
            .field("peer", &self.reply_to.peer())
            .field("line", &self.line)
            .finish()
    }
}
