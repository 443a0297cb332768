//! Control document stored in a sled tree.

use super::record::ControlRecord;
use super::store::{ControlBackend, ControlStore};
use crate::error::Error;
use sled::{Db, Tree};
use std::sync::Arc;

/// Key of the control document inside its tree.
const CONTROL_KEY: &[u8] = b"control";

/// Control document kept under a fixed key in a sled tree named after the
/// collection.
pub struct SledControlStore {
    tree: Tree,
}

impl SledControlStore {
    /// Open or create the control tree for `collection`.
    pub fn open(db: &Db, collection: &str) -> Result<Self, Error> {
        let tree = db.open_tree(collection)?;
        Ok(Self { tree })
    }

    fn read_raw(&self) -> Result<Option<(sled::IVec, ControlRecord)>, Error> {
        match self.tree.get(CONTROL_KEY)? {
            Some(bytes) => {
                let record = ControlRecord::from_bytes(&bytes)?;
                Ok(Some((bytes, record)))
            }
            None => Ok(None),
        }
    }
}

impl ControlStore for SledControlStore {
    fn read(&self) -> Result<Option<ControlRecord>, Error> {
        Ok(self.read_raw()?.map(|(_, record)| record))
    }

    fn write(&self, record: ControlRecord) -> Result<(), Error> {
        self.tree.insert(CONTROL_KEY, record.to_bytes()?)?;
        self.tree.flush()?;
        Ok(())
    }

    fn compare_and_swap(
        &self,
        expected: Option<ControlRecord>,
        new: ControlRecord,
    ) -> Result<bool, Error> {
        // Compare decoded records, then swap against the exact bytes read so
        // a concurrent writer in between makes the swap fail.
        let current = self.read_raw()?;
        let raw = match (current, expected) {
            (None, None) => None,
            (Some((bytes, record)), Some(expected)) if record == expected => Some(bytes),
            _ => return Ok(false),
        };

        let swapped = self
            .tree
            .compare_and_swap(CONTROL_KEY, raw, Some(new.to_bytes()?))?
            .is_ok();
        if swapped {
            self.tree.flush()?;
        }
        Ok(swapped)
    }
}

impl ControlBackend for Db {
    fn open_control(&self, collection: &str) -> Result<Arc<dyn ControlStore>, Error> {
        Ok(Arc::new(SledControlStore::open(self, collection)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db() -> Db {
        sled::Config::new().temporary(true).open().unwrap()
    }

    #[test]
    fn test_read_absent() {
        let db = temp_db();
        let store = SledControlStore::open(&db, "migrations").unwrap();
        assert!(store.read().unwrap().is_none());
    }

    #[test]
    fn test_write_and_read() {
        let db = temp_db();
        let store = SledControlStore::open(&db, "migrations").unwrap();

        store.write(ControlRecord::new(4, false)).unwrap();
        assert_eq!(store.read().unwrap(), Some(ControlRecord::new(4, false)));

        store.write(ControlRecord::new(5, true)).unwrap();
        assert_eq!(store.read().unwrap(), Some(ControlRecord::new(5, true)));
    }

    #[test]
    fn test_compare_and_swap_insert_if_absent() {
        let db = temp_db();
        let store = SledControlStore::open(&db, "migrations").unwrap();

        assert!(store.compare_and_swap(None, ControlRecord::default()).unwrap());
        // Second insert-if-absent loses.
        assert!(!store.compare_and_swap(None, ControlRecord::new(9, false)).unwrap());
        assert_eq!(store.read().unwrap(), Some(ControlRecord::default()));
    }

    #[test]
    fn test_compare_and_swap_mismatch() {
        let db = temp_db();
        let store = SledControlStore::open(&db, "migrations").unwrap();
        store.write(ControlRecord::new(1, true)).unwrap();

        let swapped = store
            .compare_and_swap(Some(ControlRecord::new(1, false)), ControlRecord::new(1, true))
            .unwrap();
        assert!(!swapped);

        let swapped = store
            .compare_and_swap(Some(ControlRecord::new(1, true)), ControlRecord::new(1, false))
            .unwrap();
        assert!(swapped);
        assert_eq!(store.read().unwrap(), Some(ControlRecord::new(1, false)));
    }

    #[test]
    fn test_collections_are_isolated() {
        let db = temp_db();
        let first = db.open_control("first").unwrap();
        let second = db.open_control("second").unwrap();

        first.write(ControlRecord::new(3, false)).unwrap();
        assert!(second.read().unwrap().is_none());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let db = sled::open(dir.path()).unwrap();
            let store = SledControlStore::open(&db, "migrations").unwrap();
            store.write(ControlRecord::new(7, false)).unwrap();
        }

        let db = sled::open(dir.path()).unwrap();
        let store = SledControlStore::open(&db, "migrations").unwrap();
        assert_eq!(store.read().unwrap(), Some(ControlRecord::new(7, false)));
    }
}
