//! Advisory lock on the control document.
//!
//! The lock is the `locked` flag of the control record, taken with a
//! compare-and-swap so that cooperating processes sharing a store never run
//! two migrations at once. It is not a store-native lock: a crashed run
//! leaves the flag set until an operator calls [`LockManager::unlock`].

use super::error::MigrationError;
use crate::control::{ControlDocument, ControlRecord};
use tracing::{debug, warn};

/// Acquires and releases the control lock.
#[derive(Debug, Clone)]
pub struct LockManager {
    control: ControlDocument,
}

impl LockManager {
    /// Create a lock manager over a control document.
    pub fn new(control: ControlDocument) -> Self {
        Self { control }
    }

    /// Take the lock, failing with [`MigrationError::LockHeld`] if another
    /// run holds it.
    ///
    /// The returned guard carries the record as it was when the lock was
    /// taken and releases the lock when dropped.
    pub fn acquire(&self) -> Result<LockGuard, MigrationError> {
        loop {
            let current = self.control.get_control()?;
            if current.locked {
                return Err(MigrationError::LockHeld);
            }

            let locked = current.with_locked(true);
            if self
                .control
                .store()
                .compare_and_swap(Some(current), locked)?
            {
                debug!(version = current.version, "acquired migration lock");
                return Ok(LockGuard {
                    control: self.control.clone(),
                    record: locked,
                    released: false,
                });
            }
            // Record changed between read and swap; look again.
        }
    }

    /// Clear the lock flag, keeping the version. Idempotent.
    pub fn release(&self) -> Result<(), MigrationError> {
        release_lock(&self.control)
    }

    /// Force-clear a stuck lock, e.g. after a crashed run.
    ///
    /// Never called by the engine itself.
    pub fn unlock(&self) -> Result<(), MigrationError> {
        warn!("forcing migration lock release");
        release_lock(&self.control)
    }
}

fn release_lock(control: &ControlDocument) -> Result<(), MigrationError> {
    loop {
        let current = control.get_control()?;
        if !current.locked {
            return Ok(());
        }
        if control
            .store()
            .compare_and_swap(Some(current), current.with_locked(false))?
        {
            debug!(version = current.version, "released migration lock");
            return Ok(());
        }
    }
}

/// Holds the control lock for the duration of a run.
#[derive(Debug)]
pub struct LockGuard {
    control: ControlDocument,
    record: ControlRecord,
    released: bool,
}

impl LockGuard {
    /// The control record at the moment the lock was taken.
    pub fn record(&self) -> ControlRecord {
        self.record
    }

    /// Release the lock, reporting any storage error.
    pub fn release(mut self) -> Result<(), MigrationError> {
        self.released = true;
        release_lock(&self.control)
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = release_lock(&self.control) {
            warn!(error = %e, "failed to release migration lock on drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::MemoryControlStore;
    use std::sync::Arc;

    fn manager() -> (LockManager, ControlDocument) {
        let control = ControlDocument::new(Arc::new(MemoryControlStore::new()));
        (LockManager::new(control.clone()), control)
    }

    #[test]
    fn test_acquire_and_release() {
        let (lock, control) = manager();
        control.set_control(ControlRecord::new(3, false)).unwrap();

        let guard = lock.acquire().unwrap();
        assert_eq!(guard.record(), ControlRecord::new(3, true));
        assert!(control.get_control().unwrap().locked);

        guard.release().unwrap();
        assert_eq!(control.get_control().unwrap(), ControlRecord::new(3, false));
    }

    #[test]
    fn test_second_acquire_fails() {
        let (lock, _control) = manager();
        let _guard = lock.acquire().unwrap();

        let err = lock.acquire().unwrap_err();
        assert!(matches!(err, MigrationError::LockHeld));
    }

    #[test]
    fn test_drop_releases() {
        let (lock, control) = manager();
        {
            let _guard = lock.acquire().unwrap();
            assert!(control.get_control().unwrap().locked);
        }
        assert!(!control.get_control().unwrap().locked);
        assert!(lock.acquire().is_ok());
    }

    #[test]
    fn test_release_is_idempotent() {
        let (lock, control) = manager();
        lock.release().unwrap();
        lock.release().unwrap();
        assert_eq!(control.get_control().unwrap(), ControlRecord::default());
    }

    #[test]
    fn test_unlock_clears_stuck_lock() {
        let (lock, control) = manager();
        // Simulate a run that crashed while holding the lock.
        control.set_control(ControlRecord::new(2, true)).unwrap();
        assert!(matches!(lock.acquire(), Err(MigrationError::LockHeld)));

        lock.unlock().unwrap();
        assert_eq!(control.get_control().unwrap(), ControlRecord::new(2, false));
        assert!(lock.acquire().is_ok());
    }
}
