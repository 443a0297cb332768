//! Read/write access to the control document with lazy creation.

use super::record::ControlRecord;
use super::store::ControlStore;
use crate::error::Error;
use std::sync::Arc;

/// Handle on the control document of one collection.
#[derive(Clone)]
pub struct ControlDocument {
    store: Arc<dyn ControlStore>,
}

impl ControlDocument {
    /// Wrap an opened control store.
    pub fn new(store: Arc<dyn ControlStore>) -> Self {
        Self { store }
    }

    /// Fetch the control record, creating the default `{0, unlocked}` record
    /// if none exists yet.
    pub fn get_control(&self) -> Result<ControlRecord, Error> {
        if let Some(record) = self.store.read()? {
            return Ok(record);
        }

        let default = ControlRecord::default();
        if self.store.compare_and_swap(None, default)? {
            return Ok(default);
        }

        // Another process created it first.
        Ok(self.store.read()?.unwrap_or(default))
    }

    /// Upsert the full control record.
    pub fn set_control(&self, record: ControlRecord) -> Result<(), Error> {
        self.store.write(record)
    }

    /// Force the record back to version 0, unlocked.
    pub fn reset(&self) -> Result<(), Error> {
        self.set_control(ControlRecord::default())
    }

    /// The underlying store, for compare-and-swap users such as the lock.
    pub fn store(&self) -> &Arc<dyn ControlStore> {
        &self.store
    }
}

impl std::fmt::Debug for ControlDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlDocument").finish_non_exhaustive()
    }
}
