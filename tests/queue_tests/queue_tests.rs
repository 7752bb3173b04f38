//! Tests for WorkQueue
//!
//! These tests verify:
//! - FIFO ordering and the capacity bound
//! - Exactly `capacity` requests accepted under concurrent producers
//! - Blocking dequeue and shutdown draining
//! - Timed enqueue under the Block backpressure policy

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use trainstation::protocol::ResponseSink;
use trainstation::queue::{EnqueueOutcome, PendingRequest, WorkQueue};

// =============================================================================
// Helper Functions
// =============================================================================

struct NullSink;

impl ResponseSink for NullSink {
    fn send_response(&self, _body: &str) -> io::Result<()> {
        Ok(())
    }

    fn peer(&self) -> &str {
        "null"
    }
}

fn request(line: &str) -> PendingRequest {
    PendingRequest::new(Arc::new(NullSink), line)
}

// =============================================================================
// Basic Operations
// =============================================================================

#[test]
fn test_new_queue_is_empty() {
    let queue = WorkQueue::new(4);
    assert!(queue.is_empty());
    assert_eq!(queue.capacity(), 4);
    assert!(!queue.is_closed());
}

#[test]
fn test_fifo_order() {
    let queue = WorkQueue::new(8);
    for i in 0..5 {
        assert_eq!(queue.enqueue(request(&format!("CMD {}", i))), EnqueueOutcome::Queued);
    }

    for i in 0..5 {
        assert_eq!(queue.dequeue().unwrap().line, format!("CMD {}", i));
    }
    assert!(queue.is_empty());
}

#[test]
fn test_full_queue_drops() {
    let queue = WorkQueue::new(2);
    assert_eq!(queue.enqueue(request("A")), EnqueueOutcome::Queued);
    assert_eq!(queue.enqueue(request("B")), EnqueueOutcome::Queued);
    assert_eq!(queue.enqueue(request("C")), EnqueueOutcome::Full);

    assert_eq!(queue.len(), 2);
    assert_eq!(queue.dropped_count(), 1);
    assert_eq!(queue.dequeue().unwrap().line, "A");
    assert_eq!(queue.dequeue().unwrap().line, "B");
}

#[test]
fn test_slot_freed_after_dequeue() {
    let queue = WorkQueue::new(1);
    queue.enqueue(request("A"));
    assert_eq!(queue.enqueue(request("B")), EnqueueOutcome::Full);

    queue.dequeue();
    assert_eq!(queue.enqueue(request("C")), EnqueueOutcome::Queued);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_producers_fill_exactly_capacity() {
    const CAPACITY: usize = 50;
    const PRODUCERS: usize = 8;
    const PER_PRODUCER: usize = 20;

    let queue = Arc::new(WorkQueue::new(CAPACITY));
    let accepted = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(PRODUCERS));

    let handles: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let queue = Arc::clone(&queue);
            let accepted = Arc::clone(&accepted);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..PER_PRODUCER {
                    if queue.enqueue(request(&format!("{}-{}", p, i))) == EnqueueOutcome::Queued {
                        accepted.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(accepted.load(Ordering::SeqCst), CAPACITY);
    assert_eq!(queue.len(), CAPACITY);
    assert_eq!(queue.dropped_count(), (PRODUCERS * PER_PRODUCER - CAPACITY) as u64);
}

#[test]
fn test_dequeue_blocks_until_enqueue() {
    let queue = Arc::new(WorkQueue::new(4));

    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || queue.dequeue().map(|r| r.line))
    };

    thread::sleep(Duration::from_millis(50));
    queue.enqueue(request("WAKE"));

    assert_eq!(consumer.join().unwrap().as_deref(), Some("WAKE"));
}

#[test]
fn test_each_request_delivered_once() {
    let queue = Arc::new(WorkQueue::new(1000));
    for i in 0..500 {
        queue.enqueue(request(&i.to_string()));
    }
    queue.close();

    let consumers: Vec<_> = (0..4)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let mut seen = Vec::new();
                while let Some(req) = queue.dequeue() {
                    seen.push(req.line.parse::<usize>().unwrap());
                }
                seen
            })
        })
        .collect();

    let mut all: Vec<usize> = consumers
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    all.sort_unstable();
    assert_eq!(all, (0..500).collect::<Vec<_>>());
}

// =============================================================================
// Shutdown Tests
// =============================================================================

#[test]
fn test_close_wakes_blocked_consumers() {
    let queue = Arc::new(WorkQueue::new(4));

    let consumers: Vec<_> = (0..3)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.dequeue().is_none())
        })
        .collect();

    thread::sleep(Duration::from_millis(50));
    queue.close();

    for consumer in consumers {
        assert!(consumer.join().unwrap());
    }
}

#[test]
fn test_close_drains_then_ends() {
    let queue = WorkQueue::new(4);
    queue.enqueue(request("A"));
    queue.enqueue(request("B"));
    queue.close();

    assert_eq!(queue.enqueue(request("C")), EnqueueOutcome::Closed);
    assert_eq!(queue.dequeue().unwrap().line, "A");
    assert_eq!(queue.dequeue().unwrap().line, "B");
    assert!(queue.dequeue().is_none());
}

// =============================================================================
// Timed Enqueue Tests
// =============================================================================

#[test]
fn test_enqueue_timeout_gives_up() {
    let queue = WorkQueue::new(1);
    queue.enqueue(request("A"));

    let start = Instant::now();
    let outcome = queue.enqueue_timeout(request("B"), Duration::from_millis(50));

    assert_eq!(outcome, EnqueueOutcome::Full);
    assert!(start.elapsed() >= Duration::from_millis(50));
}

#[test]
fn test_enqueue_timeout_succeeds_when_slot_frees() {
    let queue = Arc::new(WorkQueue::new(1));
    queue.enqueue(request("A"));

    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            queue.dequeue().map(|r| r.line)
        })
    };

    let outcome = queue.enqueue_timeout(request("B"), Duration::from_secs(5));
    assert_eq!(outcome, EnqueueOutcome::Queued);
    assert_eq!(consumer.join().unwrap().as_deref(), Some("A"));
    assert_eq!(queue.dequeue().unwrap().line, "B");
}

#[test]
fn test_enqueue_timeout_on_closed_queue() {
    let queue = WorkQueue::new(1);
    queue.close();

    assert_eq!(
        queue.enqueue_timeout(request("A"), Duration::from_millis(10)),
        EnqueueOutcome::Closed
    );
}
