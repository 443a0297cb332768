//! The persisted control record.

use crate::error::Error;
use serde::{Deserialize, Serialize};

/// Persisted migration control document.
///
/// Version 0 means no migration has been applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRecord {
    /// Version of the last successfully completed step.
    pub version: u64,
    /// Whether a run currently holds the advisory lock.
    pub locked: bool,
}

impl ControlRecord {
    /// Create a record at the given version.
    pub fn new(version: u64, locked: bool) -> Self {
        Self { version, locked }
    }

    /// Copy of this record with the lock flag set.
    pub fn with_locked(self, locked: bool) -> Self {
        Self { locked, ..self }
    }

    /// Copy of this record at another version.
    pub fn with_version(self, version: u64) -> Self {
        Self { version, ..self }
    }

    /// Serialize the record to bytes.
    ///
    /// The encoding is deterministic so that stores can compare-and-swap
    /// on the raw bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a record from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(bytes).map_err(|e| Error::Deserialization(e.to_string()))
    }
}

impl std::fmt::Display for ControlRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.locked {
            write!(f, "version {} (locked)", self.version)
        } else {
            write!(f, "version {}", self.version)
        }
    }
}
