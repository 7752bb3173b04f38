//! Network Module
//!
//! TCP server, connection handling and the worker pool.
//!
//! ## Architecture
//! - Single listener thread (accepts, applies control events)
//! - One detached reader thread per connection
//! - Fixed worker pool draining the shared work queue

mod connection;
mod control;
mod server;
mod worker;

pub use connection::{Connection, ConnectionWriter, SERVER_BUSY};
#[cfg(unix)]
pub use control::forward_signals;
pub use control::{Control, ControlHandle};
pub use server::Server;
pub use worker::WorkerPool;
