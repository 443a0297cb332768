//! Migrator configuration.

use super::logger::{MigrationLogger, TracingLogger};
use std::sync::Arc;

/// Default name of the control document collection.
pub const DEFAULT_COLLECTION_NAME: &str = "migrations";

/// Options for a [`Migrator`](super::Migrator).
#[derive(Clone)]
pub struct MigratorOptions {
    /// Collection (sled tree) holding the control document.
    pub collection_name: String,
    /// Whether the engine emits log lines at all.
    pub log: bool,
    /// Whether to log when a run finds the store already at the target.
    pub log_if_latest: bool,
    /// Where log lines go.
    pub logger: Arc<dyn MigrationLogger>,
}

impl MigratorOptions {
    /// Default options.
    pub fn new() -> Self {
        Self {
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            log: true,
            log_if_latest: true,
            logger: Arc::new(TracingLogger),
        }
    }

    /// Set the collection name.
    pub fn with_collection_name(mut self, name: impl Into<String>) -> Self {
        self.collection_name = name.into();
        self
    }

    /// Enable or disable logging.
    pub fn with_log(mut self, log: bool) -> Self {
        self.log = log;
        self
    }

    /// Enable or disable the "already at version" log line.
    pub fn with_log_if_latest(mut self, log_if_latest: bool) -> Self {
        self.log_if_latest = log_if_latest;
        self
    }

    /// Use a custom logger.
    pub fn with_logger(mut self, logger: impl MigrationLogger + 'static) -> Self {
        self.logger = Arc::new(logger);
        self
    }
}

impl Default for MigratorOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MigratorOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigratorOptions")
            .field("collection_name", &self.collection_name)
            .field("log", &self.log)
            .field("log_if_latest", &self.log_if_latest)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = MigratorOptions::default();
        assert_eq!(options.collection_name, DEFAULT_COLLECTION_NAME);
        assert!(options.log);
        assert!(options.log_if_latest);
    }

    #[test]
    fn test_builder() {
        let options = MigratorOptions::new()
            .with_collection_name("_migration")
            .with_log(false)
            .with_log_if_latest(false);

        assert_eq!(options.collection_name, "_migration");
        assert!(!options.log);
        assert!(!options.log_if_latest);
    }
}
