//! Migration engine.
//!
//! This module provides sequential, versioned migrations with:
//! - A version-sorted registry of `up`/`down` step pairs
//! - Target resolution (`3`, `"latest"`, `"0,rerun"`)
//! - An advisory lock on the control record shared across processes
//! - Durable progress after every step, so failed runs resume
//!
//! # Example
//!
//! ```ignore
//! use stepwise_core::migration::{MigrationDefinition, Migrator, MigratorOptions};
//!
//! let mut migrator = Migrator::new(MigratorOptions::default());
//! migrator.config(sled::open("./data")?)?;
//!
//! migrator.add(MigrationDefinition::new(
//!     1,
//!     "create users tree",
//!     |db: sled::Db| async move { db.open_tree("users")?; Ok(()) },
//!     |db: sled::Db| async move { db.drop_tree("users")?; Ok(()) },
//! ))?;
//!
//! migrator.migrate_to("latest").await?;
//! ```

pub mod config;
pub mod definition;
pub mod error;
pub mod executor;
pub mod lock;
pub mod logger;
pub mod registry;
pub mod resolver;

// Re-export main types

pub use config::{MigratorOptions, DEFAULT_COLLECTION_NAME};
pub use definition::{Direction, MigrationDefinition, StepFn, StepFuture};
pub use error::{MigrationError, StepError};
pub use executor::{MigrationReport, Migrator};
pub use lock::{LockGuard, LockManager};
pub use logger::{MigrationLogger, Severity, TracingLogger};
pub use registry::MigrationRegistry;
pub use resolver::{TargetDescriptor, TargetSpec, VersionResolver, LATEST, RERUN};
