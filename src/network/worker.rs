//! Worker Pool
//!
//! Fixed set of threads draining the work queue.

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::commands::{CommandError, Dispatcher};
use crate::error::Result;
use crate::queue::WorkQueue;

/// Fixed-size pool; each worker loops dequeue → dispatch → respond
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `size` workers on `queue`
    pub fn spawn(size: usize, queue: Arc<WorkQueue>, dispatcher: Arc<Dispatcher>) -> Result<Self> {
        let mut handles = Vec::with_capacity(size);
        for id in 0..size {
            let queue = Arc::clone(&queue);
            let dispatcher = Arc::clone(&dispatcher);
            let handle = thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || run_worker(id, &queue, &dispatcher))?;
            handles.push(handle);
        }

        tracing::info!("Started {} workers", size);
        Ok(Self { handles })
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Wait for every worker to exit (after the queue is closed)
    pub fn join(self) {
        for handle in self.handles {
            if handle.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }
    }
}

fn run_worker(id: usize, queue: &WorkQueue, dispatcher: &Dispatcher) {
    tracing::debug!("Worker {} started", id);

    while let Some(request) = queue.dequeue() {
        let peer = request.reply_to.peer();
        let dispatched =
            panic::catch_unwind(AssertUnwindSafe(|| dispatcher.dispatch(&request.line, peer)));
        let body = match dispatched {
            Ok(body) => body,
            Err(_) => {
                tracing::error!("Worker {}: command {:?} from {} panicked", id, request.line, peer);
                CommandError::Internal.to_string()
            }
        };

        if let Err(e) = request.reply_to.send_response(&body) {
            log_send_failure(peer, &e);
        }
    }

    tracing::debug!("Worker {} stopped", id);
}

/// A client that left before its answer is routine, not a worker failure
fn log_send_failure(peer: &str, e: &io::Error) {
    match e.kind() {
        io::ErrorKind::NotConnected
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted => {
            tracing::debug!("Client {} disconnected before response could be sent: {}", peer, e);
        }
        _ => tracing::warn!("Error writing to {}: {}", peer, e),
    }
}
