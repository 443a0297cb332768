//! Control document storage.
//!
//! The control document is the single persisted record `{version, locked}`
//! that tracks how far a data store has been migrated and whether a run is
//! in flight. Backends only need three atomic primitives on that document:
//! read, write, and compare-and-swap.

pub mod adapter;
pub mod memory;
pub mod record;
pub mod sled_store;
pub mod store;

pub use adapter::ControlDocument;
pub use memory::{MemoryBackend, MemoryControlStore};
pub use record::ControlRecord;
pub use sled_store::SledControlStore;
pub use store::{ControlBackend, ControlStore};
