//! Registry implementation
//!
//! Vec-backed train table behind one exclusive lock.

use parking_lot::Mutex;

use crate::error::Result;
use crate::storage::{SnapshotStore, StoredTrain};

use super::presentation::PresentationAssigner;
use super::train::{TrainRecord, MAX_ID_LEN};

/// The authoritative, process-wide set of trains
///
/// ## Concurrency
/// - `records`: one `Mutex` for every read and write; no read-side sharing.
/// - Snapshot writes happen while the lock is held, so the file always matches
///   some state the table actually passed through.
/// - The lock is never held across a network send; callers format their
///   response inside the closure and write it after it returns.
pub struct Registry {
    /// Trains in load order
    records: Mutex<Vec<TrainRecord>>,

    /// Backing snapshot file
    store: Box<dyn SnapshotStore>,

    /// Fills amenity/route text on load
    assigner: Box<dyn PresentationAssigner>,
}

impl Registry {
    /// Create an empty registry; call [`Registry::load`] to populate it
    pub fn new(
        store: impl SnapshotStore + 'static,
        assigner: impl PresentationAssigner + 'static,
    ) -> Self {
        Self::from_boxed(Box::new(store), Box::new(assigner))
    }

    pub fn from_boxed(
        store: Box<dyn SnapshotStore>,
        assigner: Box<dyn PresentationAssigner>,
    ) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            store,
            assigner,
        }
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Replace the whole table from the snapshot store
    ///
    /// Holds the lock for the full read so no mutation can be saved and then
    /// silently overwritten by the swap. On failure the current table is kept.
    pub fn load(&self) -> Result<usize> {
        let mut records = self.records.lock();

        let stored = self.store.load()?;
        let mut fresh = Vec::with_capacity(stored.len());
        for train in stored {
            if train.id.is_empty() || train.id.len() > MAX_ID_LEN {
                tracing::warn!("Skipping snapshot entry with invalid id {:?}", train.id);
                continue;
            }
            let mut record = TrainRecord::new(train.id, train.departure, train.arrival, train.delay);
            let presentation = self.assigner.assign(&record.id);
            record.amenities = presentation.amenities;
            record.route = presentation.route;
            fresh.push(record);
        }

        *records = fresh;
        tracing::info!("Loaded {} trains from {}", records.len(), self.store.describe());
        Ok(records.len())
    }

    /// Write the current table to the snapshot store
    pub fn save(&self) -> Result<()> {
        let records = self.records.lock();
        self.persist(&records)
    }

    /// Called with the lock held
    fn persist(&self, records: &[TrainRecord]) -> Result<()> {
        let stored: Vec<StoredTrain> = records.iter().map(StoredTrain::from).collect();
        self.store.save(&stored)
    }

    /// Persist after a mutation; a failed write leaves memory authoritative
    fn persist_after_mutation(&self, records: &[TrainRecord]) {
        if let Err(e) = self.persist(records) {
            tracing::warn!(
                "Failed to save snapshot to {}: {} (in-memory state kept)",
                self.store.describe(),
                e
            );
        }
    }

    // =========================================================================
    // Access
    // =========================================================================

    /// Position of a train in load order (linear scan)
    pub fn find(&self, id: &str) -> Option<usize> {
        self.records.lock().iter().position(|t| t.id == id)
    }

    /// Run a read-only closure over the table under the lock
    pub fn read<R>(&self, f: impl FnOnce(&[TrainRecord]) -> R) -> R {
        let records = self.records.lock();
        f(&records)
    }

    /// Run a read-only closure over one train
    pub fn read_train<R>(&self, id: &str, f: impl FnOnce(&TrainRecord) -> R) -> Option<R> {
        let records = self.records.lock();
        records.iter().find(|t| t.id == id).map(f)
    }

    /// Mutate one train, then persist the whole table before releasing the lock
    ///
    /// Returns `None` if the id is unknown. If the closure returns `Err` the
    /// table is not saved; the closure must leave the record untouched in that
    /// case.
    pub fn mutate<R, E>(
        &self,
        id: &str,
        f: impl FnOnce(&mut TrainRecord) -> std::result::Result<R, E>,
    ) -> Option<std::result::Result<R, E>> {
        let mut records = self.records.lock();
        let train = records.iter_mut().find(|t| t.id == id)?;
        let outcome = f(train);
        if outcome.is_ok() {
            self.persist_after_mutation(&records);
        }
        Some(outcome)
    }

    /// Apply a change to every train, then persist; returns how many were touched
    pub fn mutate_all(&self, mut f: impl FnMut(&mut TrainRecord) -> bool) -> usize {
        let mut records = self.records.lock();
        let touched = records.iter_mut().map(|t| f(t)).filter(|&changed| changed).count();
        self.persist_after_mutation(&records);
        touched
    }

    /// Clone of the current table
    pub fn snapshot(&self) -> Vec<TrainRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Where the snapshot lives, for log lines
    pub fn store_description(&self) -> String {
        self.store.describe()
    }
}
