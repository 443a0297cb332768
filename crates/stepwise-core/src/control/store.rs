//! Storage contract for the control document.

use super::record::ControlRecord;
use crate::error::Error;
use std::sync::Arc;

/// Atomic operations on a single control document.
///
/// No multi-document transactions are assumed. Every method acts on one
/// document only.
pub trait ControlStore: Send + Sync {
    /// Read the document, or `None` if it has never been written.
    fn read(&self) -> Result<Option<ControlRecord>, Error>;

    /// Overwrite the whole document.
    fn write(&self, record: ControlRecord) -> Result<(), Error>;

    /// Replace the document with `new` only if it currently equals `expected`.
    ///
    /// `expected = None` means "only if absent". Returns whether the swap
    /// happened.
    fn compare_and_swap(
        &self,
        expected: Option<ControlRecord>,
        new: ControlRecord,
    ) -> Result<bool, Error>;
}

/// A data-store handle that can host control documents.
///
/// The handle is also what migration steps receive, so it is expected to be
/// cheap to clone.
pub trait ControlBackend: Clone + Send + Sync + 'static {
    /// Open the control document stored under `collection`.
    fn open_control(&self, collection: &str) -> Result<Arc<dyn ControlStore>, Error>;
}
