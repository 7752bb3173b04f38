//! # trainstation
//!
//! A multi-client TCP train board server with:
//! - Line-based text commands (SCHEDULE, UPDATE, CANCEL, STATS, ...)
//! - A bounded work queue with a configurable backpressure policy
//! - A fixed worker pool executing commands against one locked registry
//! - Snapshot persistence after every mutation, and hot reload
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Listener (accept + control)                 │
//! │          reload / shutdown events between accepts           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ one reader thread per connection
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Work Queue                            │
//! │              (bounded FIFO, drop-on-full)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │              Worker Pool → Command Dispatcher               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Registry   │─────────▶│  Snapshot   │
//!   │  (Mutex)    │  save    │ (trains.xml)│
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod clock;
pub mod config;
pub mod error;

pub mod commands;
pub mod network;
pub mod protocol;
pub mod queue;
pub mod registry;
pub mod storage;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use commands::Dispatcher;
pub use config::Config;
pub use error::{Result, StationError};
pub use network::Server;
pub use registry::Registry;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of trainstation
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
