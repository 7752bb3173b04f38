//! Error types for trainstation
//!
//! Provides a unified error type for infrastructure operations. Command-level
//! failures that end up as response text live in [`crate::commands::CommandError`].

use thiserror::Error;

/// Result type alias using StationError
pub type Result<T> = std::result::Result<T, StationError>;

/// Unified error type for trainstation operations
#[derive(Debug, Error)]
pub enum StationError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Snapshot corruption detected: {0}")]
    Corruption(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<bincode::Error> for StationError {
    fn from(err: bincode::Error) -> Self {
        StationError::Serialization(err.to_string())
    }
}
