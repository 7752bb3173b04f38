//! Work queue implementation
//!
//! Fixed-capacity ring buffer (a `VecDeque` that never grows past its initial
//! capacity) guarded by a `Mutex`, with two condition variables.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::PendingRequest;

/// Result of offering a request to the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Accepted; exactly one waiting worker was woken
    Queued,

    /// Queue was full; the request was dropped
    Full,

    /// Queue is shutting down; the request was dropped
    Closed,
}

struct QueueState {
    buf: VecDeque<PendingRequest>,
    closed: bool,
    dropped: u64,
}

/// Bounded multi-producer / multi-consumer FIFO
///
/// ## Concurrency:
/// - Producers (connection readers) never block in [`WorkQueue::enqueue`];
///   a full queue drops the request.
/// - Consumers (workers) block in [`WorkQueue::dequeue`] until a request or
///   shutdown arrives.
/// - Each successful enqueue wakes one consumer; ordering is strict FIFO.
pub struct WorkQueue {
    state: Mutex<QueueState>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl WorkQueue {
    /// Create an empty queue holding at most `capacity` requests
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                buf: VecDeque::with_capacity(capacity),
                closed: false,
                dropped: 0,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        }
    }

    /// Non-blocking enqueue; drops the request when full
    pub fn enqueue(&self, request: PendingRequest) -> EnqueueOutcome {
        let mut state = self.state.lock();
        if state.closed {
            state.dropped += 1;
            return EnqueueOutcome::Closed;
        }
        if state.buf.len() >= self.capacity {
            state.dropped += 1;
            return EnqueueOutcome::Full;
        }
        state.buf.push_back(request);
        self.not_empty.notify_one();
        EnqueueOutcome::Queued
    }

    /// Enqueue, waiting up to `timeout` for a free slot before dropping
    pub fn enqueue_timeout(&self, request: PendingRequest, timeout: Duration) -> EnqueueOutcome {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();

        while !state.closed && state.buf.len() >= self.capacity {
            if self.not_full.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }

        if state.closed {
            state.dropped += 1;
            return EnqueueOutcome::Closed;
        }
        if state.buf.len() >= self.capacity {
            state.dropped += 1;
            return EnqueueOutcome::Full;
        }
        state.buf.push_back(request);
        self.not_empty.notify_one();
        EnqueueOutcome::Queued
    }

    /// Block until a request is available
    ///
    /// Returns `None` once the queue is closed and drained.
    pub fn dequeue(&self) -> Option<PendingRequest> {
        let mut state = self.state.lock();
        loop {
            if let Some(request) = state.buf.pop_front() {
                self.not_full.notify_one();
                return Some(request);
            }
            if state.closed {
                return None;
            }
            self.not_empty.wait(&mut state);
        }
    }

    /// Stop accepting requests and wake every waiter
    ///
    /// Requests already queued are still handed out by `dequeue`.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Requests currently waiting
    pub fn len(&self) -> usize {
        self.state.lock().buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Requests refused since creation (full or closed)
    pub fn dropped_count(&self) -> u64 {
        self.state.lock().dropped
    }
}
