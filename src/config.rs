//! Configuration for trainstation
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, StationError};

/// Main configuration for a trainstation server
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Registry snapshot file (loaded at startup and on reload)
    pub data_file: PathBuf,

    /// On-disk encoding of the snapshot file
    pub snapshot_format: SnapshotFormat,

    /// Append-only log written by REPORT
    pub report_log: PathBuf,

    // -------------------------------------------------------------------------
    // Queue / Worker Configuration
    // -------------------------------------------------------------------------
    /// Work queue capacity (requests beyond this are subject to backpressure)
    pub queue_capacity: usize,

    /// Number of worker threads draining the queue
    pub worker_threads: usize,

    /// What a connection reader does when the queue is full
    pub backpressure: Backpressure,

    // -------------------------------------------------------------------------
    // Command Configuration
    // -------------------------------------------------------------------------
    /// How the first token of a line is matched against command keywords
    pub match_mode: MatchMode,

    /// Whether RESET clears a cancellation
    pub reset_policy: ResetPolicy,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Per-connection line buffer capacity; overflow bytes are dropped
    pub max_line_bytes: usize,

    /// Listener tick: how long to wait for control events between accepts
    pub poll_interval_ms: u64,
}

/// Snapshot file encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    /// Human-readable `trains.xml` layout
    Xml,

    /// bincode payload behind a checksummed header
    Binary,
}

/// Policy applied when the work queue is full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backpressure {
    /// Silently drop the request; the client never gets a reply
    Drop,

    /// Drop the request and answer with a "server busy" response
    Reject,

    /// Wait up to `timeout` for a free slot, then drop
    Block { timeout: Duration },
}

/// Keyword matching rule used by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// First keyword (in table order) that prefixes the line wins
    Prefix,

    /// First token must equal a keyword exactly
    Exact,
}

/// Behavior of RESET on a cancelled train
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPolicy {
    /// RESET clears the cancellation and restores the scheduled arrival
    Revive,

    /// Cancelled trains are left untouched by RESET
    KeepCancelled,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("./trains.xml"),
            snapshot_format: SnapshotFormat::Xml,
            report_log: PathBuf::from("./reports.log"),
            queue_capacity: 50,
            worker_threads: 4,
            backpressure: Backpressure::Drop,
            match_mode: MatchMode::Prefix,
            reset_policy: ResetPolicy::Revive,
            listen_addr: "127.0.0.1:8080".to_string(),
            max_line_bytes: 1023,
            poll_interval_ms: 100,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(StationError::Config("queue capacity must be at least 1".into()));
        }
        if self.worker_threads == 0 {
            return Err(StationError::Config("worker pool needs at least 1 thread".into()));
        }
        if self.max_line_bytes == 0 {
            return Err(StationError::Config("line buffer must hold at least 1 byte".into()));
        }
        Ok(())
    }

    /// Listener tick as a Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the snapshot file path
    pub fn data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_file = path.into();
        self
    }

    /// Set the snapshot encoding
    pub fn snapshot_format(mut self, format: SnapshotFormat) -> Self {
        self.config.snapshot_format = format;
        self
    }

    /// Set the REPORT log path
    pub fn report_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.report_log = path.into();
        self
    }

    /// Set the work queue capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Set the worker pool size
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the backpressure policy
    pub fn backpressure(mut self, policy: Backpressure) -> Self {
        self.config.backpressure = policy;
        self
    }

    /// Set the dispatcher match mode
    pub fn match_mode(mut self, mode: MatchMode) -> Self {
        self.config.match_mode = mode;
        self
    }

    /// Set the RESET policy
    pub fn reset_policy(mut self, policy: ResetPolicy) -> Self {
        self.config.reset_policy = policy;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the per-connection line buffer capacity (in bytes)
    pub fn max_line_bytes(mut self, bytes: usize) -> Self {
        self.config.max_line_bytes = bytes;
        self
    }

    /// Set the listener tick (in milliseconds)
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
