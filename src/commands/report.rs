//! Report log
//!
//! Append-only, human-readable side file written by REPORT.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::Result;

/// Append-only report file
#[derive(Debug)]
pub struct ReportLog {
    path: PathBuf,

    /// Keeps concurrent appends from interleaving
    write_lock: Mutex<()>,
}

impl ReportLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Append `[timestamp] Client <peer> reported: <message>`
    pub fn append(&self, timestamp: &str, peer: &str, message: &str) -> Result<()> {
        let line = format!("[{}] Client {} reported: {}\n", timestamp, peer, message);

        let _guard = self.write_lock.lock();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
