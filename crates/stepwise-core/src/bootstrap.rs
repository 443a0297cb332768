//! Startup hook that migrates to a target taken from the environment.

use crate::control::ControlBackend;
use crate::migration::{MigrationError, MigrationReport, Migrator};

/// Conventional name of the variable holding the startup target.
pub const MIGRATE_ENV: &str = "MIGRATE";

/// Run `migrate_to` with the value of the environment variable `var`.
///
/// Does nothing and returns `Ok(None)` when the variable is unset or blank.
pub async fn migrate_from_env<D: ControlBackend>(
    migrator: &Migrator<D>,
    var: &str,
) -> Result<Option<MigrationReport>, MigrationError> {
    let descriptor = match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => return Ok(None),
    };

    tracing::info!(descriptor = %descriptor, var, "migrating from environment");
    migrator.migrate_to(descriptor).await.map(Some)
}
