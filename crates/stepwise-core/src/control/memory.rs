//! In-process control backend.

use super::record::ControlRecord;
use super::store::{ControlBackend, ControlStore};
use crate::error::Error;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// A control document held in memory.
#[derive(Debug, Default)]
pub struct MemoryControlStore {
    record: Mutex<Option<ControlRecord>>,
}

impl MemoryControlStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ControlStore for MemoryControlStore {
    fn read(&self) -> Result<Option<ControlRecord>, Error> {
        Ok(*self.record.lock())
    }

    fn write(&self, record: ControlRecord) -> Result<(), Error> {
        *self.record.lock() = Some(record);
        Ok(())
    }

    fn compare_and_swap(
        &self,
        expected: Option<ControlRecord>,
        new: ControlRecord,
    ) -> Result<bool, Error> {
        let mut guard = self.record.lock();
        if *guard != expected {
            return Ok(false);
        }
        *guard = Some(new);
        Ok(true)
    }
}

/// In-memory backend keeping one control document per collection.
///
/// Clones share the same documents, so two migrators configured with clones
/// of one backend contend for the same lock.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    collections: Arc<Mutex<HashMap<String, Arc<MemoryControlStore>>>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ControlBackend for MemoryBackend {
    fn open_control(&self, collection: &str) -> Result<Arc<dyn ControlStore>, Error> {
        let store: Arc<dyn ControlStore> = self
            .collections
            .lock()
            .entry(collection.to_string())
            .or_default()
            .clone();
        Ok(store)
    }
}
