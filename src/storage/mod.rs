//! Storage Module
//!
//! Registry snapshots on disk.
//!
//! ## Responsibilities
//! - Load the full train set (id, departure, arrival, delay)
//! - Save the full train set so readers never see a half-written file
//! - Hide the encoding behind [`SnapshotStore`]
//!
//! ## Formats
//! - [`XmlSnapshotStore`]: the human-editable `trains.xml` layout
//! - [`BinarySnapshotStore`]: bincode payload behind a CRC-checked header
//! - [`MemorySnapshotStore`]: no file at all, for tests

mod binary;
mod memory;
mod xml;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::SnapshotFormat;
use crate::error::Result;
use crate::registry::{TimeOfDay, TrainRecord};

pub use binary::BinarySnapshotStore;
pub use memory::MemorySnapshotStore;
pub use xml::XmlSnapshotStore;

/// The persisted part of a train record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTrain {
    pub id: String,
    pub departure: TimeOfDay,
    pub arrival: TimeOfDay,
    pub delay: i32,
}

impl From<&TrainRecord> for StoredTrain {
    fn from(record: &TrainRecord) -> Self {
        Self {
            id: record.id.clone(),
            departure: record.departure,
            arrival: record.arrival,
            delay: record.delay(),
        }
    }
}

/// Load/save pair for the registry snapshot
pub trait SnapshotStore: Send + Sync {
    /// Read every stored train, in file order
    fn load(&self) -> Result<Vec<StoredTrain>>;

    /// Replace the stored set with `trains`
    fn save(&self, trains: &[StoredTrain]) -> Result<()>;

    /// Location for log lines
    fn describe(&self) -> String;
}

/// Shared handle: lets a test keep the store while the registry owns a clone
impl<S: SnapshotStore + ?Sized> SnapshotStore for Arc<S> {
    fn load(&self) -> Result<Vec<StoredTrain>> {
        (**self).load()
    }

    fn save(&self, trains: &[StoredTrain]) -> Result<()> {
        (**self).save(trains)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Open the store matching `format` at `path`
pub fn open_store(format: SnapshotFormat, path: impl Into<PathBuf>) -> Box<dyn SnapshotStore> {
    match format {
        SnapshotFormat::Xml => Box::new(XmlSnapshotStore::new(path)),
        SnapshotFormat::Binary => Box::new(BinarySnapshotStore::new(path)),
    }
}

/// Write `bytes` to a sibling temp file, sync it, then rename over `path`
pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }

    fs::rename(&tmp_path, path)?;
    Ok(())
}
