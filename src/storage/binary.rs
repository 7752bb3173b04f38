//! Binary snapshot store
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Header (14 bytes)                                            │
//! │   Magic: "TRNS" (4) | Version: u16 (2) | Len: u32 (4) | CRC (4) │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Payload (Len bytes)                                          │
//! │   bincode-encoded Vec<StoredTrain>                           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//! All integers little-endian. CRC32 covers the payload only.

use std::fs;
use std::path::PathBuf;

use crate::error::{Result, StationError};

use super::{write_atomically, SnapshotStore, StoredTrain};

/// Magic bytes identifying a trainstation snapshot
pub(crate) const MAGIC: &[u8; 4] = b"TRNS";

/// Current snapshot format version
pub(crate) const VERSION: u16 = 1;

/// Magic (4) + Version (2) + PayloadLen (4) + CRC (4)
pub(crate) const HEADER_SIZE: usize = 14;

/// Snapshot store for the checksummed bincode format
#[derive(Debug, Clone)]
pub struct BinarySnapshotStore {
    path: PathBuf,
}

impl BinarySnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Encode trains with header and checksum
    pub fn encode(trains: &[StoredTrain]) -> Result<Vec<u8>> {
        let payload = bincode::serialize(trains)?;
        let crc = crc32fast::hash(&payload);

        let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&VERSION.to_le_bytes());
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&crc.to_le_bytes());
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// Validate header and checksum, then decode
    pub fn decode(bytes: &[u8]) -> Result<Vec<StoredTrain>> {
        if bytes.len() < HEADER_SIZE {
            return Err(StationError::Corruption(format!(
                "Incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        if &bytes[0..4] != MAGIC {
            return Err(StationError::Corruption("bad magic bytes".to_string()));
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != VERSION {
            return Err(StationError::Corruption(format!(
                "unsupported snapshot version {}",
                version
            )));
        }

        let payload_len = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]) as usize;
        let expected_crc = u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]);

        let payload = &bytes[HEADER_SIZE..];
        if payload.len() != payload_len {
            return Err(StationError::Corruption(format!(
                "payload length mismatch: header says {}, file has {}",
                payload_len,
                payload.len()
            )));
        }

        let actual_crc = crc32fast::hash(payload);
        if actual_crc != expected_crc {
            return Err(StationError::Corruption(format!(
                "checksum mismatch: expected {:08x}, got {:08x}",
                expected_crc, actual_crc
            )));
        }

        Ok(bincode::deserialize(payload)?)
    }
}

impl SnapshotStore for BinarySnapshotStore {
    fn load(&self) -> Result<Vec<StoredTrain>> {
        let bytes = fs::read(&self.path)?;
        Self::decode(&bytes)
    }

    fn save(&self, trains: &[StoredTrain]) -> Result<()> {
        let bytes = Self::encode(trains)?;
        write_atomically(&self.path, &bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
