//! In-memory snapshot store
//!
//! Keeps the last saved set in memory and counts saves, so tests can assert
//! that a mutation was persisted without touching the filesystem.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::error::{Result, StationError};

use super::{SnapshotStore, StoredTrain};

/// Snapshot store backed by a `Vec`
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    trains: Mutex<Option<Vec<StoredTrain>>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MemorySnapshotStore {
    /// Store with nothing saved yet; `load` fails until the first save
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `trains`
    pub fn with_trains(trains: Vec<StoredTrain>) -> Self {
        Self {
            trains: Mutex::new(Some(trains)),
            ..Self::default()
        }
    }

    /// Last saved (or seeded) set
    pub fn contents(&self) -> Option<Vec<StoredTrain>> {
        self.trains.lock().clone()
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Make every following save fail with a storage error
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Vec<StoredTrain>> {
        self.trains
            .lock()
            .clone()
            .ok_or_else(|| StationError::Storage("no snapshot saved".to_string()))
    }

    fn save(&self, trains: &[StoredTrain]) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StationError::Storage("snapshot writes disabled".to_string()));
        }
        *self.trains.lock() = Some(trains.to_vec());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
