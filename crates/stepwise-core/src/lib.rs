//! Stepwise Core - Versioned migration engine.
//!
//! Tracks the version a data store has been migrated to in a persisted
//! control record and applies or reverts registered migration steps to
//! reach a requested version.

pub mod bootstrap;
pub mod control;
pub mod error;
pub mod migration;

pub use bootstrap::{migrate_from_env, MIGRATE_ENV};
pub use control::{
    ControlBackend, ControlDocument, ControlRecord, ControlStore, MemoryBackend,
    MemoryControlStore, SledControlStore,
};
pub use error::Error;
pub use migration::{
    Direction, LockManager, MigrationDefinition, MigrationError, MigrationLogger,
    MigrationRegistry, MigrationReport, Migrator, MigratorOptions, Severity, StepError,
    TargetDescriptor, TargetSpec, TracingLogger, VersionResolver, DEFAULT_COLLECTION_NAME,
};
