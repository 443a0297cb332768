//! Migration-specific error types.

use super::definition::Direction;
use thiserror::Error;

/// Boxed cause returned by a failing migration step.
pub type StepError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Migration errors.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The target descriptor or a definition could not be validated.
    #[error("validation failed: {message}")]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// Another run holds the control lock.
    #[error("control record is locked; another migration is in progress")]
    LockHeld,

    /// A migration with this version is already registered.
    #[error("duplicate migration version {version}")]
    DuplicateVersion {
        /// The colliding version.
        version: u64,
    },

    /// A step's `up` or `down` failed.
    #[error("migration {version} ({name}) failed while migrating {direction}: {source}")]
    StepFailed {
        /// Version of the failing migration.
        version: u64,
        /// Name of the failing migration.
        name: String,
        /// Direction the step was run in.
        direction: Direction,
        /// The step's own error.
        #[source]
        source: StepError,
    },

    /// The migrator was used before `config` bound a data store.
    #[error("migrator is not configured")]
    NotConfigured,

    /// Control store error.
    #[error("storage error: {0}")]
    Storage(#[from] crate::error::Error),
}

impl MigrationError {
    /// Shorthand for a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        MigrationError::Validation {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_step_failed_keeps_cause() {
        let err = MigrationError::StepFailed {
            version: 5,
            name: "add index".to_string(),
            direction: Direction::Up,
            source: "disk full".into(),
        };
        assert_eq!(
            err.to_string(),
            "migration 5 (add index) failed while migrating up: disk full"
        );
        assert_eq!(err.source().unwrap().to_string(), "disk full");
    }

    #[test]
    fn test_storage_from() {
        let err: MigrationError = crate::error::Error::Serialization("bad".to_string()).into();
        assert!(err.to_string().contains("serialization error: bad"));
    }
}
